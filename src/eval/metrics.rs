//! Per-case ranking metrics

use crate::eval::QueryType;
use serde::Serialize;
use std::collections::HashSet;

/// Precision/recall/F1 at the evaluation cutoff plus reciprocal rank
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CaseMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub mrr: f64,
}

impl CaseMetrics {
    /// Arithmetic mean across cases; all zeros when `items` is empty
    pub(crate) fn mean<'a>(items: impl Iterator<Item = &'a CaseMetrics>) -> CaseMetrics {
        let mut count = 0usize;
        let mut sum = CaseMetrics::default();
        for metrics in items {
            count += 1;
            sum.precision += metrics.precision;
            sum.recall += metrics.recall;
            sum.f1 += metrics.f1;
            sum.mrr += metrics.mrr;
        }
        if count == 0 {
            return CaseMetrics::default();
        }
        let n = count as f64;
        CaseMetrics {
            precision: sum.precision / n,
            recall: sum.recall / n,
            f1: sum.f1 / n,
            mrr: sum.mrr / n,
        }
    }
}

/// Compute metrics for one case
///
/// Relevance semantics differ by query type. Year cases reduce relevance to
/// a year-prefix match: every member of `relevant` shares one year by
/// construction, and duplicate retrievals count. Topic and mixed cases use
/// exact set membership over deduplicated retrievals.
///
/// Degenerate inputs (nothing retrieved, empty relevant set) produce zero
/// metrics rather than dividing by zero.
pub fn case_metrics(
    retrieved: &[String],
    relevant: &HashSet<String>,
    query_type: QueryType,
) -> CaseMetrics {
    let (relevant_retrieved, total_retrieved, first_relevant_rank) = match query_type {
        QueryType::Year => {
            let Some(year) = relevant
                .iter()
                .next()
                .and_then(|doc| doc.split('_').next())
                .map(str::to_owned)
            else {
                // Malformed case with no relevant docs to take a year from
                return CaseMetrics::default();
            };
            let hits = retrieved.iter().filter(|doc| doc.starts_with(&year)).count();
            let rank = retrieved
                .iter()
                .position(|doc| doc.starts_with(&year))
                .map(|i| i + 1);
            (hits, retrieved.len(), rank)
        }
        QueryType::Topic | QueryType::Mixed => {
            let unique: HashSet<&String> = retrieved.iter().collect();
            let hits = unique
                .iter()
                .filter(|doc| relevant.contains(doc.as_str()))
                .count();
            let rank = retrieved
                .iter()
                .position(|doc| relevant.contains(doc))
                .map(|i| i + 1);
            (hits, unique.len(), rank)
        }
    };

    let total_relevant = relevant.len();
    let precision = if total_retrieved > 0 {
        relevant_retrieved as f64 / total_retrieved as f64
    } else {
        0.0
    };
    let recall = if total_relevant > 0 {
        relevant_retrieved as f64 / total_relevant as f64
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let mrr = first_relevant_rank.map(|rank| 1.0 / rank as f64).unwrap_or(0.0);

    CaseMetrics {
        precision,
        recall,
        f1,
        mrr,
    }
}
