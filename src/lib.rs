//! Regional decline indicators.
//!
//! Parses caret-delimited `year^region^metric^value` statistics, derives the
//! population, business and building-stock decline criteria per region, and
//! merges them into a summary ranking regions by criteria met.

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod report;

pub use cache::ProcessedDataCache;
pub use error::PipelineError;
pub use models::*;
pub use pipeline::Pipeline;
