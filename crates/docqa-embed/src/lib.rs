//! docqa-embed
//!
//! Embedder adapters behind [`docqa_core::traits::Embedder`]:
//! - [`HashEmbedder`]: deterministic feature hashing, no model required
//! - [`OllamaEmbedder`]: a local Ollama server
//!
//! Pick one from configuration with [`get_embedder`].

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use std::sync::Arc;

use docqa_core::config::{EmbeddingConfig, EmbeddingProvider};
use docqa_core::traits::Embedder;
use docqa_core::Result;

mod hash;
mod limit;
mod ollama;

pub use hash::HashEmbedder;
pub use limit::{check_input_len, truncate_to_limit};
pub use ollama::OllamaEmbedder;

pub fn get_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    config.validate()?;
    let embedder: Arc<dyn Embedder> = match config.provider {
        EmbeddingProvider::Hash => {
            tracing::info!(dim = config.dimension, "using hash embedder");
            Arc::new(HashEmbedder::with_max_input_chars(config.dimension, config.max_input_chars))
        }
        EmbeddingProvider::Ollama => {
            tracing::info!(model = %config.model, url = %config.base_url, "using Ollama embedder");
            Arc::new(OllamaEmbedder::new(config)?)
        }
    };
    Ok(embedder)
}
