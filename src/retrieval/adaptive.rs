//! Adaptive batch expansion for unfiltered semantic queries

use crate::providers::{IndexError, Match};
use ahash::AHashMap;
use std::collections::hash_map::Entry;

/// Knobs for one expansion run
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExpansionConfig {
    pub initial_batch_size: usize,
    pub relevance_threshold: f32,
    pub max_results: usize,
}

/// Grow the requested batch until scores fall below the relevance threshold
///
/// Each round re-queries from rank 1 with a doubled batch, so rounds overlap
/// heavily. Accumulation must therefore deduplicate by id, keeping the
/// highest observed score, before the threshold filter and cap are applied;
/// skipping the dedup inflates totals downstream.
///
/// Stops when a round comes back empty, comes back short (index exhausted),
/// or ends on a score below the threshold.
pub(crate) fn expand_until_irrelevant<F>(
    mut fetch: F,
    config: &ExpansionConfig,
) -> Result<Vec<Match>, IndexError>
where
    F: FnMut(usize) -> Result<Vec<Match>, IndexError>,
{
    let mut best: AHashMap<String, Match> = AHashMap::new();
    let mut batch_size = config.initial_batch_size;
    // Optimistic sentinel so the loop always runs at least once
    let mut last_score = 1.0f32;

    while last_score >= config.relevance_threshold {
        let matches = fetch(batch_size)?;
        if matches.is_empty() {
            break;
        }

        let returned = matches.len();
        last_score = matches.last().map(|m| m.score).unwrap_or(0.0);
        tracing::debug!(
            requested = batch_size,
            returned,
            last_score,
            "expansion round complete"
        );

        for m in matches {
            match best.entry(m.id.clone()) {
                Entry::Occupied(mut slot) => {
                    if m.score > slot.get().score {
                        slot.insert(m);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(m);
                }
            }
        }

        if returned < batch_size {
            // Index exhausted
            break;
        }
        batch_size *= 2;
    }

    let mut results: Vec<Match> = best
        .into_values()
        .filter(|m| m.score >= config.relevance_threshold)
        .collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    results.truncate(config.max_results);
    Ok(results)
}
