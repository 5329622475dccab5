//! Persistence for listings, pipelines, and market snapshots. The only backend is in-process
//! memory; nothing survives a restart.

pub mod memory;
pub mod repository;
pub mod seed;

pub use memory::MemoryTable;
pub use repository::{MarketRepository, PipelineRepository, PropertyRepository, Repositories};
