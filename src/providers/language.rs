//! Language-understanding service interface

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("Completion request failed: {0}")]
    RequestFailed(String),

    #[error("Empty response from language service")]
    EmptyResponse,
}

/// Trait for language-understanding backends
///
/// The core only needs free-form completion. Returned text may wrap
/// structured data in arbitrary surrounding prose; consumers are responsible
/// for locating the structure and degrading gracefully when it is absent.
pub trait LanguageModel: Send + Sync {
    /// Complete a prompt and return the raw response text
    fn complete(&self, prompt: &str) -> Result<String, LanguageModelError>;
}
