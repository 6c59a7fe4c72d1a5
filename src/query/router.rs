//! Subject classification and index routing
//!
//! Each subject domain has its own index. A query is classified into exactly
//! one subject before retrieval; ambiguity or service failure falls back to
//! a fixed default so retrieval always proceeds against some index.

use crate::providers::{LanguageModel, SimilarityIndex};
use std::sync::Arc;

/// Subject domains with dedicated indexes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Deliberate bias: the default subject on ambiguous classification
    #[default]
    Physics,
    Chemistry,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
        }
    }
}

/// Outcome of subject classification
///
/// `Defaulted` marks the fallback taken on ambiguity or service failure, so
/// callers and tests can tell genuine confidence from silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Resolved(Subject),
    Defaulted(Subject),
}

impl Classification {
    pub fn subject(&self) -> Subject {
        match self {
            Classification::Resolved(subject) | Classification::Defaulted(subject) => *subject,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Classification::Defaulted(_))
    }
}

/// Classifies queries into a single subject via the language service
pub struct SubjectRouter {
    model: Arc<dyn LanguageModel>,
}

impl SubjectRouter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Classify a query into exactly one subject; never fails
    pub fn classify(&self, query: &str) -> Classification {
        let prompt = format!(
            "Classify the exam question query into exactly one subject.\n\
             Answer with a single word, either \"physics\" or \"chemistry\".\n\n\
             Query: \"{query}\""
        );

        let response = match self.model.complete(&prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Subject classification call failed, defaulting: {e}");
                return Classification::Defaulted(Subject::default());
            }
        };

        let lower = response.to_ascii_lowercase();
        let physics = lower.contains("physics");
        let chemistry = lower.contains("chemistry");
        match (physics, chemistry) {
            (true, false) => Classification::Resolved(Subject::Physics),
            (false, true) => Classification::Resolved(Subject::Chemistry),
            _ => {
                tracing::warn!(response = %response.trim(), "Ambiguous subject classification, defaulting");
                Classification::Defaulted(Subject::default())
            }
        }
    }
}

/// Per-subject index handles
///
/// `index_for` is a total lookup: every subject has a handle by
/// construction, so routing needs no fallback of its own.
pub struct SubjectIndexes {
    physics: Arc<dyn SimilarityIndex>,
    chemistry: Arc<dyn SimilarityIndex>,
}

impl SubjectIndexes {
    pub fn new(physics: Arc<dyn SimilarityIndex>, chemistry: Arc<dyn SimilarityIndex>) -> Self {
        Self { physics, chemistry }
    }

    pub fn index_for(&self, subject: Subject) -> &Arc<dyn SimilarityIndex> {
        match subject {
            Subject::Physics => &self.physics,
            Subject::Chemistry => &self.chemistry,
        }
    }
}
