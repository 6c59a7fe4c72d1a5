//! Interfaces honored by external collaborators
//!
//! The core consumes three services it does not implement: a
//! language-understanding service for filter extraction and subject
//! classification, an embedding service for dense vectors, and a similarity
//! index for hybrid search. Each is a trait so deployments can plug in their
//! own backends and tests can script exact behavior.

mod embedding;
mod index;
mod language;

pub use embedding::{EmbeddingError, EmbeddingMode, EmbeddingProvider};
pub use index::{IndexError, IndexQuery, Match, QuestionMetadata, SimilarityIndex};
pub use language::{LanguageModel, LanguageModelError};
