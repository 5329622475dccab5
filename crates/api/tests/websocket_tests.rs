use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use pulse_api::AppState;
use pulse_core::analysis::Assumptions;
use pulse_core::storage::Repositories;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> (SocketAddr, Arc<AppState>) {
    let state = Arc::new(AppState::new(Repositories::in_memory(), Assumptions::default(), 16));
    let app = pulse_api::router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    client
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a message")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_json(client: &mut Client, value: Value) {
    client.send(Message::Text(value.to_string())).await.unwrap();
}

#[tokio::test]
async fn greets_new_sessions() {
    let (addr, state) = spawn_server().await;
    let mut client = connect(addr).await;

    let hello = next_json(&mut client).await;
    assert_eq!(hello["type"], "connected");
    assert!(hello["sessionId"].as_str().unwrap().starts_with("ws-"));
    assert_eq!(state.ws.active_connections(), 1);
}

#[tokio::test]
async fn answers_ping_with_pong() {
    let (addr, _) = spawn_server().await;
    let mut client = connect(addr).await;
    next_json(&mut client).await;

    send_json(&mut client, json!({ "type": "ping", "timestamp": 1234 })).await;
    let pong = next_json(&mut client).await;
    assert_eq!(pong["type"], "pong");
    assert_eq!(pong["timestamp"], 1234);
}

#[tokio::test]
async fn broadcasts_reach_only_subscribers() {
    let (addr, state) = spawn_server().await;

    let mut subscriber = connect(addr).await;
    next_json(&mut subscriber).await;
    send_json(&mut subscriber, json!({ "type": "subscribe", "topics": ["property_update"] })).await;
    let ack = next_json(&mut subscriber).await;
    assert_eq!(ack["type"], "subscribed");
    assert_eq!(ack["topics"], json!(["property_update"]));

    let mut bystander = connect(addr).await;
    next_json(&mut bystander).await;

    send_json(
        &mut bystander,
        json!({ "type": "property_update", "property": { "id": "p-1", "price": 990000 } }),
    )
    .await;

    let update = next_json(&mut subscriber).await;
    assert_eq!(update["type"], "property_update");
    assert_eq!(update["data"]["id"], "p-1");

    // The bystander never subscribed; its next message is the reply to this ping.
    state.ws.publish("pipeline_update", json!({ "userId": "alice" }));
    send_json(&mut bystander, json!({ "type": "ping", "timestamp": 1 })).await;
    assert_eq!(next_json(&mut bystander).await["type"], "pong");
}
