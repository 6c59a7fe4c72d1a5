//! Query engine: filter extraction, routing, and similarity search

use crate::config::RetrievalConfig;
use crate::providers::{
    EmbeddingError, EmbeddingMode, EmbeddingProvider, IndexError, IndexQuery, Match,
    SimilarityIndex,
};
use crate::query::{FilterExtractor, FilterSet, SubjectIndexes, SubjectRouter};
use crate::retrieval::adaptive::{expand_until_irrelevant, ExpansionConfig};
use std::sync::Arc;
use thiserror::Error;

/// Backend failures during a search
///
/// Extraction and classification failures never surface here; they degrade
/// inside their components. A failed embedding or index call has no safe
/// default result set, so it propagates unmodified for the caller to decide.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Embedding generation failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index query failed: {0}")]
    Index(#[from] IndexError),
}

/// Per-call search limits; defaults mirror `RetrievalConfig`
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Result cap for the filtered path
    pub top_k: usize,
    /// Score floor for the adaptive path
    pub relevance_threshold: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            relevance_threshold: 0.5,
        }
    }
}

/// Index selection strategy
pub enum IndexRoute {
    /// One index serves every query
    Single(Arc<dyn SimilarityIndex>),
    /// Classify each query into a subject and use that subject's index
    BySubject {
        router: SubjectRouter,
        indexes: SubjectIndexes,
    },
}

impl IndexRoute {
    fn resolve(&self, query: &str) -> &Arc<dyn SimilarityIndex> {
        match self {
            IndexRoute::Single(index) => index,
            IndexRoute::BySubject { router, indexes } => {
                let classification = router.classify(query);
                tracing::debug!(
                    subject = classification.subject().as_str(),
                    defaulted = classification.is_defaulted(),
                    "routed query"
                );
                indexes.index_for(classification.subject())
            }
        }
    }
}

/// Retrieval engine over a semantically indexed question bank
pub struct QueryEngine {
    extractor: FilterExtractor,
    embedder: Arc<dyn EmbeddingProvider>,
    route: IndexRoute,
    config: RetrievalConfig,
}

impl QueryEngine {
    pub fn new(
        extractor: FilterExtractor,
        embedder: Arc<dyn EmbeddingProvider>,
        route: IndexRoute,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            extractor,
            embedder,
            route,
            config,
        }
    }

    /// Search with the configured defaults
    ///
    /// An `Ok` with no matches means the query genuinely matched nothing;
    /// it is never a masked failure.
    pub fn search(&self, query: &str) -> Result<Vec<Match>, SearchError> {
        self.search_with(
            query,
            SearchOptions {
                top_k: self.config.top_k,
                relevance_threshold: self.config.relevance_threshold,
            },
        )
    }

    /// Search with explicit per-call limits
    pub fn search_with(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<Match>, SearchError> {
        let parsed = self.extractor.extract(query);
        let index = self.route.resolve(query);
        let vector = self.embedder.embed(&parsed.search_text, EmbeddingMode::Query)?;

        if !parsed.filters.is_empty() {
            // Filters bound the result set, so one capped query suffices;
            // the index's native descending order stands.
            tracing::debug!(filters = parsed.filters.len(), top_k = options.top_k, "filtered search");
            let request = IndexQuery {
                vector: &vector,
                filter: &parsed.filters,
                top_k: options.top_k,
                include_metadata: true,
                hybrid_alpha: self.config.hybrid_alpha,
            };
            return Ok(index.query(&request)?);
        }

        // No filters: an unconstrained semantic query has no natural cutoff,
        // so grow the batch until scores drop below the threshold.
        tracing::debug!(
            threshold = options.relevance_threshold,
            "unfiltered search, expanding adaptively"
        );
        let unconstrained = FilterSet::new();
        let expansion = ExpansionConfig {
            initial_batch_size: self.config.initial_batch_size,
            relevance_threshold: options.relevance_threshold,
            max_results: self.config.max_results,
        };
        expand_until_irrelevant(
            |batch_size| {
                let request = IndexQuery {
                    vector: &vector,
                    filter: &unconstrained,
                    top_k: batch_size,
                    include_metadata: true,
                    hybrid_alpha: self.config.hybrid_alpha,
                };
                index.query(&request)
            },
            &expansion,
        )
        .map_err(SearchError::from)
    }
}
