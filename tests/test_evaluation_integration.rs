//! Integration test: evaluation harness over the full retrieval pipeline

use paperchase::config::{EvaluationConfig, RetrievalConfig};
use paperchase::eval::{load_cases_json, Evaluator, QueryType};
use paperchase::providers::{
    EmbeddingError, EmbeddingMode, EmbeddingProvider, IndexError, IndexQuery, LanguageModel,
    LanguageModelError, Match, QuestionMetadata, SimilarityIndex,
};
use paperchase::query::{FilterExtractor, FilterField};
use paperchase::retrieval::{IndexRoute, QueryEngine};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Extracts a year filter when the query names one, otherwise no filters
struct YearAwareModel;

impl LanguageModel for YearAwareModel {
    fn complete(&self, prompt: &str) -> Result<String, LanguageModelError> {
        let query = prompt
            .split("Query: \"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap_or_default();
        let year = query
            .split_whitespace()
            .find(|word| word.len() == 4 && word.chars().all(|c| c.is_ascii_digit()));
        Ok(match year {
            Some(year) => format!(
                "{{\"filters\": {{\"year\": \"{year}\"}}, \"search_text\": \"{query}\"}}"
            ),
            None => format!("{{\"filters\": {{}}, \"search_text\": \"{query}\"}}"),
        })
    }
}

struct UnitEmbedder;

impl EmbeddingProvider for UnitEmbedder {
    fn embed(&self, _text: &str, _mode: EmbeddingMode) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vec![1.0, 0.0])
    }

    fn dimension(&self) -> usize {
        2
    }
}

/// Index that honors year filters and scores topic relevance by keyword
struct BankIndex {
    docs: Vec<(f32, QuestionMetadata)>,
}

impl SimilarityIndex for BankIndex {
    fn query(&self, request: &IndexQuery<'_>) -> Result<Vec<Match>, IndexError> {
        let year = request.filter.get(FilterField::Year);
        let mut hits: Vec<Match> = self
            .docs
            .iter()
            .filter(|(_, meta)| year.map_or(true, |y| meta.year == y))
            .map(|(score, meta)| Match {
                id: meta.doc_id(),
                score: *score,
                metadata: meta.clone(),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(request.top_k);
        Ok(hits)
    }
}

fn question(year: &str, variant: &str, number: &str, score: f32) -> (f32, QuestionMetadata) {
    (
        score,
        QuestionMetadata {
            year: year.to_string(),
            variant: variant.to_string(),
            question_number: number.to_string(),
            ..Default::default()
        },
    )
}

fn engine() -> QueryEngine {
    let index = Arc::new(BankIndex {
        docs: vec![
            // Vector questions score high for the topic query
            question("2023", "11", "1", 0.95),
            question("2021", "11", "1", 0.9),
            // Fillers that should fall under the relevance threshold
            question("2023", "11", "30", 0.3),
            question("2022", "12", "8", 0.2),
        ],
    });
    QueryEngine::new(
        FilterExtractor::new(Arc::new(YearAwareModel)),
        Arc::new(UnitEmbedder),
        IndexRoute::Single(index),
        RetrievalConfig::default(),
    )
}

const TEST_SET: &str = r#"[
    {
        "query": "Find questions about vectors and scalars",
        "relevant_docs": ["2023_Variant11_Q1", "2021_Variant11_Q1"],
        "query_type": "topic"
    },
    {
        "query": "Show me questions from 2023 paper",
        "relevant_docs": ["2023_Variant11_Q1", "2023_Variant11_Q30"],
        "query_type": "year"
    }
]"#;

#[test]
fn evaluates_a_test_set_end_to_end() {
    init_tracing();
    let engine = engine();
    let cases = load_cases_json(TEST_SET).unwrap();
    let evaluator = Evaluator::new(&EvaluationConfig::default());

    let report = evaluator.evaluate(&cases, |query| engine.search(query));

    assert_eq!(report.evaluated(), 2);
    assert_eq!(report.failed(), 0);

    // Topic query runs the adaptive path: both vector questions retrieved,
    // both relevant, fillers thresholded away
    let topic = &report.by_query_type[&QueryType::Topic];
    assert_eq!(topic.precision, 1.0);
    assert_eq!(topic.recall, 1.0);
    assert_eq!(topic.mrr, 1.0);

    // Year query runs the filtered path: every 2023 doc counts under the
    // prefix rule regardless of score
    let year = &report.by_query_type[&QueryType::Year];
    assert_eq!(year.precision, 1.0);
    assert_eq!(year.recall, 1.0);

    assert_eq!(report.overall.f1, 1.0);
}

#[test]
fn repeated_runs_produce_identical_reports() {
    init_tracing();
    let engine = engine();
    let cases = load_cases_json(TEST_SET).unwrap();
    let evaluator = Evaluator::new(&EvaluationConfig::default());

    let first = evaluator.evaluate(&cases, |query| engine.search(query));
    let second = evaluator.evaluate(&cases, |query| engine.search(query));

    assert_eq!(first.overall, second.overall);
    assert_eq!(first.by_query_type, second.by_query_type);
    assert_eq!(first.evaluated(), second.evaluated());
}
