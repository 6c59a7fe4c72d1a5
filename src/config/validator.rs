use crate::config::Config;
use crate::error::{PaperchaseError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_retrieval(config, &mut errors);
        Self::validate_evaluation(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PaperchaseError::ConfigValidation { errors })
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        let retrieval = &config.retrieval;

        if retrieval.top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }

        if !(0.0..=1.0).contains(&retrieval.relevance_threshold) {
            errors.push(ValidationError::new(
                "retrieval.relevance_threshold",
                format!(
                    "Relevance threshold must be in [0, 1], got {}",
                    retrieval.relevance_threshold
                ),
            ));
        }

        if !(0.0..=1.0).contains(&retrieval.hybrid_alpha) {
            errors.push(ValidationError::new(
                "retrieval.hybrid_alpha",
                format!(
                    "Hybrid blend weight must be in [0, 1], got {}",
                    retrieval.hybrid_alpha
                ),
            ));
        }

        if retrieval.initial_batch_size == 0 {
            errors.push(ValidationError::new(
                "retrieval.initial_batch_size",
                "Initial batch size must be greater than 0",
            ));
        }

        if retrieval.max_results == 0 {
            errors.push(ValidationError::new(
                "retrieval.max_results",
                "Result cap must be greater than 0",
            ));
        }
    }

    fn validate_evaluation(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.evaluation.cutoff == 0 {
            errors.push(ValidationError::new(
                "evaluation.cutoff",
                "Evaluation cutoff must be greater than 0",
            ));
        }
    }
}
