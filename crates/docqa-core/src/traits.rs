use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Embedding, IndexEntry, IndexSpec, Metric, ScoredMatch};

/// Text to vector capability.
///
/// Implementations must be deterministic for a fixed model and return
/// vectors of exactly `dimension()` floats.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model and dimensionality (e.g. `ollama:bge-m3:d1024`).
    fn embedder_id(&self) -> &str;
    fn dimension(&self) -> usize;
    /// The metric the model's vectors are meant to be compared with.
    fn metric(&self) -> Metric;
    /// Longest accepted input, in characters.
    fn max_input_chars(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Batch form of [`Embedder::embed`]; results match per-item calls.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn index_spec(&self) -> IndexSpec {
        IndexSpec {
            metric: self.metric(),
            dimension: self.dimension(),
            embedder_id: self.embedder_id().to_string(),
        }
    }
}

/// Similarity index over passage embeddings.
///
/// `search` must be safe for concurrent readers; `add` is serialized against
/// them by the implementation.
pub trait VectorIndexer: Send + Sync {
    fn spec(&self) -> &IndexSpec;
    /// Upsert by passage id.
    fn add(&self, entries: Vec<IndexEntry>) -> Result<()>;
    /// Top `k` matches by descending score, ties in insertion order.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredMatch>>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dimension(&self) -> usize {
        self.spec().dimension
    }

    fn metric(&self) -> Metric {
        self.spec().metric
    }

    fn embedder_id(&self) -> &str {
        &self.spec().embedder_id
    }
}

/// Everything the completion capability sees for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub context: String,
    pub query: String,
}

/// Text generation capability.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    fn model_name(&self) -> &str;
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
