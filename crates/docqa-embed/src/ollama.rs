//! Embeddings from a running Ollama server via `POST /api/embed`.
//!
//! Ollama does not distinguish query and document inputs, so `embed` and
//! `embed_many` hit the same endpoint and produce identical vectors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use docqa_core::config::EmbeddingConfig;
use docqa_core::traits::Embedder;
use docqa_core::types::{Embedding, Metric};
use docqa_core::{Error, Result};

use crate::limit::check_input_len;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    dim: usize,
    max_input_chars: usize,
    batch_size: usize,
    id: String,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: format!("{}/api/embed", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            dim: config.dimension,
            max_input_chars: config.max_input_chars,
            batch_size: config.batch_size.max(1),
            id: format!("ollama:{}:d{}", config.model, config.dimension),
        })
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Embedding>> {
        let response = self
            .client
            .post(&self.url)
            .json(&EmbedRequest { model: &self.model, input })
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!("HTTP {status} from {}: {body}", self.url)));
        }
        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("malformed response: {e}")))?;
        self.validate(input.len(), parsed.embeddings)
    }

    fn validate(&self, expected: usize, embeddings: Vec<Embedding>) -> Result<Vec<Embedding>> {
        if embeddings.len() != expected {
            return Err(Error::Embedding(format!(
                "expected {expected} embeddings but {} returned {}",
                self.model,
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dim) {
            return Err(Error::Embedding(format!(
                "{} returned a {}-dimensional vector, configured dimension is {}",
                self.model,
                bad.len(),
                self.dim
            )));
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
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
        let mut out = self.request(&[text.to_string()]).await?;
        out.pop()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        for text in texts {
            check_input_len(text, self.max_input_chars)?;
        }
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!(size = batch.len(), model = %self.model, "embedding batch");
            out.extend(self.request(batch).await?);
        }
        Ok(out)
    }
}
