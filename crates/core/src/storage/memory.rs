use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::market::{normalize_location, MarketSnapshot};
use crate::domain::pipeline::Pipeline;
use crate::domain::property::Property;
use crate::storage::repository::{MarketRepository, PipelineRepository, PropertyRepository};

/// Process-local table. Clones share the same map.
#[derive(Debug)]
pub struct MemoryTable<K, V> {
    rows: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Default for MemoryTable<K, V> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> Clone for MemoryTable<K, V> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<K: Eq + Hash, V: Clone> MemoryTable<K, V> {
    async fn get_row<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.rows.read().await.get(key).cloned()
    }

    async fn all_rows(&self) -> Vec<V> {
        self.rows.read().await.values().cloned().collect()
    }

    async fn put_row(&self, key: K, value: V) {
        self.rows.write().await.insert(key, value);
    }
}

#[async_trait::async_trait]
impl PropertyRepository for MemoryTable<Uuid, Property> {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Property>> {
        Ok(self.get_row(&id).await)
    }

    async fn list(&self) -> anyhow::Result<Vec<Property>> {
        let mut out = self.all_rows().await;
        out.sort_by(|a, b| {
            b.listed_date
                .cmp(&a.listed_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(out)
    }

    async fn upsert(&self, property: Property) -> anyhow::Result<()> {
        self.put_row(property.id, property).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PipelineRepository for MemoryTable<String, Pipeline> {
    async fn get(&self, user_id: &str) -> anyhow::Result<Option<Pipeline>> {
        Ok(self.get_row(user_id).await)
    }

    async fn list(&self) -> anyhow::Result<Vec<Pipeline>> {
        let mut out = self.all_rows().await;
        out.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(out)
    }

    async fn upsert(&self, pipeline: Pipeline) -> anyhow::Result<()> {
        self.put_row(pipeline.user_id.clone(), pipeline).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MarketRepository for MemoryTable<String, MarketSnapshot> {
    async fn get(&self, location: &str) -> anyhow::Result<Option<MarketSnapshot>> {
        Ok(self.get_row(normalize_location(location).as_str()).await)
    }

    async fn list(&self) -> anyhow::Result<Vec<MarketSnapshot>> {
        let mut out = self.all_rows().await;
        out.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(out)
    }

    async fn upsert(&self, snapshot: MarketSnapshot) -> anyhow::Result<()> {
        self.put_row(normalize_location(&snapshot.location), snapshot)
            .await;
        Ok(())
    }
}
