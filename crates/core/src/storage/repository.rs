use std::sync::Arc;

use uuid::Uuid;

use crate::domain::market::MarketSnapshot;
use crate::domain::pipeline::Pipeline;
use crate::domain::property::Property;
use crate::storage::memory::MemoryTable;

#[async_trait::async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Property>>;

    /// All listings, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Property>>;

    async fn upsert(&self, property: Property) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait PipelineRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> anyhow::Result<Option<Pipeline>>;

    async fn list(&self) -> anyhow::Result<Vec<Pipeline>>;

    async fn upsert(&self, pipeline: Pipeline) -> anyhow::Result<()>;
}

/// Keyed by upper-cased location.
#[async_trait::async_trait]
pub trait MarketRepository: Send + Sync {
    async fn get(&self, location: &str) -> anyhow::Result<Option<MarketSnapshot>>;

    async fn list(&self) -> anyhow::Result<Vec<MarketSnapshot>>;

    async fn upsert(&self, snapshot: MarketSnapshot) -> anyhow::Result<()>;
}

/// The repositories the API and CLI work against.
#[derive(Clone)]
pub struct Repositories {
    pub properties: Arc<dyn PropertyRepository>,
    pub pipelines: Arc<dyn PipelineRepository>,
    pub markets: Arc<dyn MarketRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            properties: Arc::new(MemoryTable::<Uuid, Property>::default()),
            pipelines: Arc::new(MemoryTable::<String, Pipeline>::default()),
            markets: Arc::new(MemoryTable::<String, MarketSnapshot>::default()),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
