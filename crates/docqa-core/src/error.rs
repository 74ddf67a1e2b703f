use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The source directory or one of its files could not be read.
    #[error("Load failed: {0}")]
    Load(String),

    /// The embedding capability failed or returned an unusable vector.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Embedding input of {chars} chars exceeds the model limit of {limit}")]
    EmbeddingInputTooLong { chars: usize, limit: usize },

    /// A persisted index or a vector does not match the active embedder.
    #[error("Index incompatible: {0}")]
    IndexCompatibility(String),

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("Storage failed: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// True for failures of the embedding capability, including oversize input.
    pub fn is_embedding(&self) -> bool {
        matches!(self, Error::Embedding(_) | Error::EmbeddingInputTooLong { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
