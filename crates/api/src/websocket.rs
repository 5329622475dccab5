//! Push channel for listing and pipeline changes.
//!
//! Clients subscribe to topics; every broadcast is fanned out to the sessions subscribed to its
//! topic. Delivery is best effort: slow sessions skip what they missed.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::AppState;

pub const TOPIC_PROPERTY_UPDATE: &str = "property_update";
pub const TOPIC_PIPELINE_UPDATE: &str = "pipeline_update";

const WELCOME: &str = "PropertyPulse WebSocket active";

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Replaces the session's topic set.
    Subscribe {
        #[serde(default)]
        topics: Vec<String>,
    },
    /// Rebroadcast a listing change to `property_update` subscribers.
    PropertyUpdate { property: Value },
    Ping { timestamp: i64 },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        #[serde(rename = "sessionId")]
        session_id: String,
        message: String,
    },
    Subscribed {
        topics: Vec<String>,
    },
    Pong {
        timestamp: i64,
        #[serde(rename = "serverTime")]
        server_time: i64,
    },
    Error {
        message: String,
    },
}

/// A message for every session subscribed to `topic`. Sent as `{"type": topic, "data": data}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Broadcast {
    pub topic: String,
    pub data: Value,
}

impl Broadcast {
    fn to_json(&self) -> Value {
        serde_json::json!({ "type": self.topic, "data": self.data })
    }
}

pub struct WebSocketState {
    broadcast_tx: broadcast::Sender<Broadcast>,
    connection_count: AtomicUsize,
    session_counter: AtomicU64,
}

impl WebSocketState {
    pub fn new(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            broadcast_tx,
            connection_count: AtomicUsize::new(0),
            session_counter: AtomicU64::new(0),
        }
    }

    pub fn next_session_id(&self) -> String {
        let id = self.session_counter.fetch_add(1, Ordering::SeqCst);
        format!("ws-{id}")
    }

    /// Returns how many sessions were listening; zero is not an error.
    pub fn publish(&self, topic: &str, data: Value) -> usize {
        self.broadcast_tx
            .send(Broadcast {
                topic: topic.to_string(),
                data,
            })
            .unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.broadcast_tx.subscribe()
    }

    pub fn active_connections(&self) -> usize {
        self.connection_count.load(Ordering::SeqCst)
    }
}

struct ClientSession {
    session_id: String,
    topics: HashSet<String>,
}

impl ClientSession {
    fn wants(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

type WsSender = SplitSink<WebSocket, Message>;

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let ws_state = &state.ws;
    let mut session = ClientSession {
        session_id: ws_state.next_session_id(),
        topics: HashSet::new(),
    };
    ws_state.connection_count.fetch_add(1, Ordering::SeqCst);
    tracing::info!(session_id = %session.session_id, "websocket connected");

    let mut broadcast_rx = ws_state.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let connected = ServerMessage::Connected {
        session_id: session.session_id.clone(),
        message: WELCOME.to_string(),
    };

    if send_json(&mut sender, &connected).await.is_ok() {
        loop {
            tokio::select! {
                incoming = receiver.next() => {
                    let text = match incoming {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                            Ok(text) => text,
                            Err(_) => continue,
                        },
                        Some(Ok(Message::Ping(data))) => {
                            if sender.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                            continue;
                        }
                        Some(Ok(Message::Pong(_))) => continue,
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(err)) => {
                            tracing::warn!(session_id = %session.session_id, error = %err, "websocket receive failed");
                            break;
                        }
                    };

                    let reply = handle_client_message(&text, &mut session, ws_state);
                    if let Some(reply) = reply {
                        if send_json(&mut sender, &reply).await.is_err() {
                            break;
                        }
                    }
                }
                update = broadcast_rx.recv() => {
                    match update {
                        Ok(update) => {
                            if session.wants(&update.topic)
                                && send_json(&mut sender, &update.to_json()).await.is_err()
                            {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(session_id = %session.session_id, skipped, "websocket session lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    }

    ws_state.connection_count.fetch_sub(1, Ordering::SeqCst);
    tracing::info!(session_id = %session.session_id, "websocket closed");
}

fn handle_client_message(
    text: &str,
    session: &mut ClientSession,
    ws_state: &WebSocketState,
) -> Option<ServerMessage> {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(err) => {
            return Some(ServerMessage::Error {
                message: format!("invalid message: {err}"),
            })
        }
    };

    match msg {
        ClientMessage::Subscribe { topics } => {
            session.topics = topics.iter().cloned().collect();
            tracing::debug!(session_id = %session.session_id, ?topics, "websocket subscribed");
            Some(ServerMessage::Subscribed { topics })
        }
        ClientMessage::PropertyUpdate { property } => {
            ws_state.publish(TOPIC_PROPERTY_UPDATE, property);
            None
        }
        ClientMessage::Ping { timestamp } => Some(ServerMessage::Pong {
            timestamp,
            server_time: chrono::Utc::now().timestamp_millis(),
        }),
    }
}

async fn send_json<T: Serialize>(sender: &mut WsSender, msg: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string(msg)?;
    sender.send(Message::Text(json)).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSocketStatus {
    pub active_connections: usize,
}

pub async fn ws_status(State(state): State<Arc<AppState>>) -> Json<WebSocketStatus> {
    Json(WebSocketStatus {
        active_connections: state.ws.active_connections(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> ClientSession {
        ClientSession {
            session_id: "ws-0".to_string(),
            topics: HashSet::new(),
        }
    }

    #[test]
    fn subscribe_replaces_topics() {
        let state = WebSocketState::new(8);
        let mut s = session();
        s.topics.insert("old".to_string());

        let reply = handle_client_message(
            r#"{"type":"subscribe","topics":["property_update"]}"#,
            &mut s,
            &state,
        );
        assert!(matches!(reply, Some(ServerMessage::Subscribed { .. })));
        assert!(s.wants("property_update"));
        assert!(!s.wants("old"));
    }

    #[test]
    fn property_update_is_rebroadcast() {
        let state = WebSocketState::new(8);
        let mut rx = state.subscribe();
        let mut s = session();

        let reply = handle_client_message(
            r#"{"type":"property_update","property":{"id":"p1","price":1}}"#,
            &mut s,
            &state,
        );
        assert!(reply.is_none());

        let update = rx.try_recv().unwrap();
        assert_eq!(update.topic, TOPIC_PROPERTY_UPDATE);
        assert_eq!(
            update.to_json(),
            json!({"type": "property_update", "data": {"id": "p1", "price": 1}})
        );
    }

    #[test]
    fn malformed_message_gets_error_reply() {
        let state = WebSocketState::new(8);
        let reply = handle_client_message("{not json", &mut session(), &state);
        assert!(matches!(reply, Some(ServerMessage::Error { .. })));

        let reply = handle_client_message(r#"{"type":"launch"}"#, &mut session(), &state);
        assert!(matches!(reply, Some(ServerMessage::Error { .. })));
    }

    #[test]
    fn ping_gets_pong() {
        let state = WebSocketState::new(8);
        let reply = handle_client_message(r#"{"type":"ping","timestamp":42}"#, &mut session(), &state);
        let v = serde_json::to_value(reply.unwrap()).unwrap();
        assert_eq!(v["type"], "pong");
        assert_eq!(v["timestamp"], 42);
        assert!(v["serverTime"].is_i64());
    }

    #[test]
    fn connected_message_shape() {
        let v = serde_json::to_value(ServerMessage::Connected {
            session_id: "ws-1".to_string(),
            message: WELCOME.to_string(),
        })
        .unwrap();
        assert_eq!(
            v,
            json!({"type": "connected", "sessionId": "ws-1", "message": "PropertyPulse WebSocket active"})
        );
    }

    #[test]
    fn publish_without_listeners_is_fine() {
        let state = WebSocketState::new(8);
        assert_eq!(state.publish(TOPIC_PIPELINE_UPDATE, json!({})), 0);

        let _rx = state.subscribe();
        assert_eq!(state.publish(TOPIC_PIPELINE_UPDATE, json!({})), 1);
        assert_ne!(state.next_session_id(), state.next_session_id());
    }
}
