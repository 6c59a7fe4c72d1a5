//! Paperchase - semantic retrieval over an exam question bank
//!
//! Translates natural-language queries into structured metadata filters plus
//! a normalized search string, retrieves ranked matches from a similarity
//! index using either a bounded top-k query or adaptive batch expansion, and
//! measures retrieval quality against labeled test sets.

pub mod config;
pub mod error;
pub mod eval;
pub mod providers;
pub mod query;
pub mod retrieval;

pub use error::{PaperchaseError, Result};
