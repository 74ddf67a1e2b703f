use std::sync::Arc;

use docqa_core::config::RetrievalConfig;
use docqa_core::traits::{Embedder, VectorIndexer};
use docqa_core::types::ScoredMatch;
use docqa_core::{Error, Result};
use docqa_embed::truncate_to_limit;

/// Query text to the passages that pass the relevance threshold.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndexer>,
    config: RetrievalConfig,
}

impl Retriever {
    /// Fails with [`Error::IndexCompatibility`] when the embedder would
    /// produce vectors the index cannot be compared against.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndexer>,
        config: RetrievalConfig,
    ) -> Result<Self> {
        config.validate()?;
        let expected = embedder.index_spec();
        if index.spec() != &expected {
            return Err(Error::IndexCompatibility(format!(
                "index built for {:?}, embedder is {:?}",
                index.spec(),
                expected
            )));
        }
        Ok(Self { embedder, index, config })
    }

    /// Retrieve with the configured `top_k` and `min_score`.
    pub async fn retrieve_query(&self, query: &str) -> Result<Vec<ScoredMatch>> {
        self.retrieve(query, self.config.top_k, self.config.min_score).await
    }

    /// At most `top_k` matches with `score >= min_score`, best first.
    ///
    /// A blank query matches nothing and never reaches the embedder.
    pub async fn retrieve(&self, query: &str, top_k: usize, min_score: f32) -> Result<Vec<ScoredMatch>> {
        let query = query.trim();
        if query.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let limit = self.embedder.max_input_chars();
        let text = truncate_to_limit(query, limit);
        if text.len() < query.len() {
            tracing::warn!(limit, "query longer than embedder input limit, truncating");
        }

        let vector = self.embedder.embed(text).await?;
        let mut matches = self.index.search(&vector, top_k)?;
        // results are sorted, so everything after the first miss misses too
        let keep = matches.iter().take_while(|m| m.score >= min_score).count();
        matches.truncate(keep);
        tracing::debug!(hits = matches.len(), min_score, "retrieval done");
        Ok(matches)
    }
}
