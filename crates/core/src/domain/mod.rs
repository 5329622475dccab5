pub mod contract;
pub mod market;
pub mod pipeline;
pub mod property;
