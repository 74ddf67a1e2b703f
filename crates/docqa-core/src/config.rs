use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Layered configuration source.
///
/// Merges `config.toml`, then `config.<env>.toml` for `RUST_ENV`
/// (`dev` when unset), then `APP_*` variables with `__` between sections.
pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_file(Path::new("config.toml"))
    }

    /// Like [`Config::load`] but with an explicit base file; the env overlay is
    /// looked up next to it.
    pub fn load_file(path: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            other => tracing::debug!(env = other, "no overlay file for environment"),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    /// Extract and validate the full typed configuration.
    pub fn app(&self) -> Result<AppConfig> {
        let app: AppConfig = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub completion: CompletionConfig,
    pub chat: ChatConfig,
    pub ingest: IngestConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        self.embedding.validate()?;
        if self.ingest.concurrency == 0 {
            return Err(Error::InvalidConfig("ingest.concurrency must be at least 1".into()));
        }
        if self.chunking.max_chars > self.embedding.max_input_chars {
            tracing::warn!(
                max_chars = self.chunking.max_chars,
                limit = self.embedding.max_input_chars,
                "passages may exceed the embedding input limit and be truncated for embedding"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source_dir: String,
    pub index_dir: String,
    /// File extensions to ingest, without the dot. Empty accepts every file.
    pub extensions: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source_dir: "./data".to_string(),
            index_dir: "./storage".to_string(),
            extensions: vec!["txt".to_string(), "md".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chars: 1000, overlap_chars: 200 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(Error::InvalidConfig("chunking.max_chars must be positive".into()));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap_chars ({}) must be smaller than max_chars ({})",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(())
    }
}

/// How many candidates to fetch and how similar they must be.
///
/// `min_score` defaults to 0.75, a typical in-domain cosine similarity for
/// small BGE-class models. It is a tuning knob: lower it for recall, raise it
/// to refuse more aggressively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub min_score: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5, min_score: 0.75 }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".into()));
        }
        if !self.min_score.is_finite() {
            return Err(Error::InvalidConfig("retrieval.min_score must be a finite number".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    /// Ollama `/api/embed` endpoint.
    Ollama,
    /// Local feature-hashing embedder, deterministic and model-free.
    Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub base_url: String,
    pub dimension: usize,
    pub max_input_chars: usize,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "bge-m3".to_string(),
            base_url: "http://localhost:11434".to_string(),
            dimension: 1024,
            max_input_chars: 8192,
            batch_size: 32,
            timeout_secs: 60,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::InvalidConfig("embedding.dimension must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be at least 1".into()));
        }
        if self.max_input_chars == 0 {
            return Err(Error::InvalidConfig("embedding.max_input_chars must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2:1b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: Some(0.0),
            timeout_secs: 120,
        }
    }
}

pub const DEFAULT_DONT_KNOW_SENTINEL: &str = "I don't know. It's not in my files";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub system_prompt: String,
    /// Phrase the model is told to emit when the context lacks the answer.
    pub dont_know_sentinel: String,
    /// Printed when retrieval found nothing above `min_score`.
    pub no_evidence_message: String,
    /// Printed when matches existed but the model could not answer from them.
    pub insufficient_evidence_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: format!(
                "You are a helpful assistant. You must answer strictly based on provided context. \
                 Provide answers in a short and concise way. If answer can't be found in the \
                 provided documents, respond with: \"{DEFAULT_DONT_KNOW_SENTINEL}\""
            ),
            dont_know_sentinel: DEFAULT_DONT_KNOW_SENTINEL.to_string(),
            no_evidence_message: "Irrelevant question, ask me about D&D".to_string(),
            insufficient_evidence_message: "I don't know, sorry".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Documents chunked and embedded at the same time.
    pub concurrency: usize,
    pub progress: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { concurrency: 4, progress: true }
    }
}

/// Expand `~` and `$VAR` / `${VAR}` in a configured path. Unknown variables
/// leave the input untouched; the result is not canonicalized.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
