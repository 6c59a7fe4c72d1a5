//! Embedding service interface

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Task mode for embedding generation
///
/// Retrieval backends distinguish document-side and query-side vectors; the
/// mode must match how the index was populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    Document,
    Query,
}

/// Trait for embedding providers
///
/// Allows abstraction over different embedding backends. The core treats the
/// provider as a black box: no batching, rate limiting, or model management
/// happens on this side of the trait.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Vec<f32>, EmbeddingError>;

    /// Embedding dimensionality, fixed at index-creation time
    fn dimension(&self) -> usize;
}
