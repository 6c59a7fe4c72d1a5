//! Adaptive retrieval engine
//!
//! Filtered queries get a single bounded hybrid search; unfiltered queries
//! have no natural cutoff, so the engine grows its requested batch until
//! scores fall below the relevance threshold.

mod adaptive;
mod engine;

pub use engine::{IndexRoute, QueryEngine, SearchError, SearchOptions};
