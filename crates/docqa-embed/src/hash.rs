use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use docqa_core::traits::Embedder;
use docqa_core::types::{Embedding, Metric};
use docqa_core::Result;

use crate::limit::check_input_len;

/// Feature-hashing embedder.
///
/// Each lower-cased alphanumeric token adds 1.0 to bucket
/// `xxh64(token) % dim`; the result is L2-normalized. Texts sharing most of
/// their words land close together, which is enough to exercise retrieval
/// without a model.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
    max_input_chars: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self::with_max_input_chars(dim, usize::MAX)
    }

    pub fn with_max_input_chars(dim: usize, max_input_chars: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, max_input_chars, id: format!("hash:xxh64:d{dim}") }
    }

    fn vectorize(&self, text: &str) -> Embedding {
        let mut v = vec![0f32; self.dim];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let idx = (hasher.finish() % self.dim as u64) as usize;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn metric(&self) -> Metric {
        Metric::Cosine
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        check_input_len(text, self.max_input_chars)?;
        Ok(self.vectorize(text))
    }
}
