//! Configuration management
//!
//! Every tunable knob lives in an explicit configuration object handed to a
//! component's constructor; nothing reads ambient global state after load.

use crate::error::{PaperchaseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Retrieval engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Result cap for the filtered (single-query) path
    pub top_k: usize,
    /// Minimum score for a match to survive adaptive expansion
    pub relevance_threshold: f32,
    /// Dense/sparse blend weight for hybrid scoring
    pub hybrid_alpha: f32,
    /// First batch size requested by adaptive expansion
    pub initial_batch_size: usize,
    /// Hard cap on the adaptive path's result set
    pub max_results: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            relevance_threshold: 0.5,
            hybrid_alpha: 0.5,
            initial_batch_size: 5,
            max_results: 50,
        }
    }
}

/// Evaluation harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Number of top matches scored per case, independent of engine defaults
    pub cutoff: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { cutoff: 20 }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PaperchaseError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| PaperchaseError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides()?;

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| PaperchaseError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("PAPERCHASE_RETRIEVAL__TOP_K") {
            self.retrieval.top_k =
                value
                    .parse()
                    .map_err(|_| PaperchaseError::InvalidConfigValue {
                        path: "retrieval.top_k".to_string(),
                        message: format!("expected positive integer, got {value}"),
                    })?;
        }
        if let Ok(value) = std::env::var("PAPERCHASE_RETRIEVAL__RELEVANCE_THRESHOLD") {
            self.retrieval.relevance_threshold =
                value
                    .parse()
                    .map_err(|_| PaperchaseError::InvalidConfigValue {
                        path: "retrieval.relevance_threshold".to_string(),
                        message: format!("expected float in [0, 1], got {value}"),
                    })?;
        }
        if let Ok(value) = std::env::var("PAPERCHASE_EVALUATION__CUTOFF") {
            self.evaluation.cutoff =
                value
                    .parse()
                    .map_err(|_| PaperchaseError::InvalidConfigValue {
                        path: "evaluation.cutoff".to_string(),
                        message: format!("expected positive integer, got {value}"),
                    })?;
        }
        Ok(())
    }
}
