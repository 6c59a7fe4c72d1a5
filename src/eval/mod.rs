//! Offline retrieval-quality evaluation
//!
//! Runs labeled test cases through a search function and reports ranking
//! metrics overall and per query type. Cases run strictly sequentially; a
//! failing case is recorded in the report instead of aborting the run.

mod metrics;

pub use metrics::{case_metrics, CaseMetrics};

use crate::config::EvaluationConfig;
use crate::error::{PaperchaseError, Result};
use crate::providers::Match;
use crate::retrieval::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Relevance semantics for an evaluation case
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Topic,
    Year,
    Mixed,
}

impl QueryType {
    pub const ALL: [QueryType; 3] = [QueryType::Topic, QueryType::Year, QueryType::Mixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Topic => "topic",
            QueryType::Year => "year",
            QueryType::Mixed => "mixed",
        }
    }
}

/// One labeled test query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationCase {
    pub query: String,
    pub relevant_docs: Vec<String>,
    pub query_type: QueryType,
}

/// Parse cases from the JSON test-set format
pub fn load_cases_json(json: &str) -> Result<Vec<EvaluationCase>> {
    serde_json::from_str(json).map_err(|e| PaperchaseError::Json {
        source: e,
        context: "evaluation test set".to_string(),
    })
}

/// Metrics for one evaluated case
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub query: String,
    pub query_type: QueryType,
    pub metrics: CaseMetrics,
}

/// A case whose search call failed
#[derive(Debug, Clone, Serialize)]
pub struct CaseFailure {
    pub query: String,
    pub error: String,
}

/// Aggregate metrics plus the per-case rows they were computed from
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Arithmetic mean over every evaluated case
    pub overall: CaseMetrics,
    /// The same means within each query-type partition
    pub by_query_type: BTreeMap<QueryType, CaseMetrics>,
    pub cases: Vec<CaseReport>,
    pub failures: Vec<CaseFailure>,
}

impl MetricsReport {
    pub fn evaluated(&self) -> usize {
        self.cases.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Evaluation harness over a search function
pub struct Evaluator {
    cutoff: usize,
}

impl Evaluator {
    pub fn new(config: &EvaluationConfig) -> Self {
        Self {
            cutoff: config.cutoff,
        }
    }

    /// Evaluate every case against `search`
    ///
    /// `search` is any closure producing ranked matches, typically borrowing
    /// a `QueryEngine`. Failures are accumulated into the report; the means
    /// cover only the cases that produced a result list. The report is a
    /// pure function of the inputs, so repeated runs agree.
    pub fn evaluate<F>(&self, cases: &[EvaluationCase], mut search: F) -> MetricsReport
    where
        F: FnMut(&str) -> std::result::Result<Vec<Match>, SearchError>,
    {
        let mut case_reports = Vec::new();
        let mut failures = Vec::new();

        for case in cases {
            let matches = match search(&case.query) {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::warn!(query = %case.query, "Case search failed: {e}");
                    failures.push(CaseFailure {
                        query: case.query.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let retrieved: Vec<String> = matches
                .iter()
                .take(self.cutoff)
                .map(|m| m.metadata.doc_id())
                .collect();
            let relevant: HashSet<String> = case.relevant_docs.iter().cloned().collect();
            let metrics = case_metrics(&retrieved, &relevant, case.query_type);

            tracing::debug!(
                query = %case.query,
                query_type = case.query_type.as_str(),
                precision = metrics.precision,
                recall = metrics.recall,
                "case evaluated"
            );
            case_reports.push(CaseReport {
                query: case.query.clone(),
                query_type: case.query_type,
                metrics,
            });
        }

        let overall = CaseMetrics::mean(case_reports.iter().map(|c| &c.metrics));
        let mut by_query_type = BTreeMap::new();
        for query_type in QueryType::ALL {
            let partition: Vec<&CaseMetrics> = case_reports
                .iter()
                .filter(|c| c.query_type == query_type)
                .map(|c| &c.metrics)
                .collect();
            if !partition.is_empty() {
                by_query_type.insert(query_type, CaseMetrics::mean(partition.into_iter()));
            }
        }

        tracing::info!(
            evaluated = case_reports.len(),
            failed = failures.len(),
            "evaluation run complete"
        );

        MetricsReport {
            overall,
            by_query_type,
            cases: case_reports,
            failures,
        }
    }
}
