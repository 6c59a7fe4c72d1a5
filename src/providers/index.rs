//! Similarity index interface and match types

use crate::query::FilterSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Index query failed: {0}")]
    QueryFailed(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Exam attributes stored alongside each indexed question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionMetadata {
    pub year: String,
    pub variant: String,
    pub question_number: String,
    pub subject_code: String,
    pub months: Vec<String>,
    #[serde(rename = "questionStatement")]
    pub statement: String,
    pub options: Vec<String>,
    pub topics: Vec<String>,
    pub image: String,
}

impl QuestionMetadata {
    /// Canonical document id, reconstructed deterministically from metadata
    pub fn doc_id(&self) -> String {
        format!(
            "{}_Variant{}_Q{}",
            self.year, self.variant, self.question_number
        )
    }
}

/// A scored hit returned from the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    /// Similarity score in [0, 1]
    pub score: f32,
    pub metadata: QuestionMetadata,
}

/// Parameters for one similarity query
#[derive(Debug, Clone)]
pub struct IndexQuery<'a> {
    pub vector: &'a [f32],
    /// Equality predicates over metadata fields; empty means unconstrained
    pub filter: &'a FilterSet,
    pub top_k: usize,
    pub include_metadata: bool,
    /// Dense/sparse blend weight for hybrid scoring
    pub hybrid_alpha: f32,
}

/// Trait for similarity-search backends
pub trait SimilarityIndex: Send + Sync {
    /// Execute one similarity query
    ///
    /// Results come back in the index's native order, descending by score.
    fn query(&self, request: &IndexQuery<'_>) -> Result<Vec<Match>, IndexError>;
}
