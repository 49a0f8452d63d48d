//! Data module - CSV loading, cleaning, aggregation and ranking

mod aggregate;
mod loader;
mod processor;
mod ranking;
pub mod schema;

pub use aggregate::{Aggregator, Summaries};
pub use loader::DataLoader;
pub use processor::{ContinentConflict, DataProcessor};
pub use ranking::{TopNRanker, DEFAULT_TOP_N};
