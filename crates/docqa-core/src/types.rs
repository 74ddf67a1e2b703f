//! Domain types shared by the loader, chunker, index and chat engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub type PassageId = String;
pub type Embedding = Vec<f32>;

/// A source file read into memory.
///
/// - `id`: path relative to the source root, `/`-separated
/// - `path`: where the file was read from
/// - `text`: the decoded UTF-8 contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub path: PathBuf,
    pub text: String,
}

/// A retrieval-sized span of a [`Document`].
///
/// `id` is `"{doc_id}:{chunk_index}"`. `chunk_index`/`total_chunks` give the
/// position within the parent document so neighbours can be looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub id: PassageId,
    pub doc_id: String,
    pub doc_path: String,
    pub text: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

impl Passage {
    pub fn make_id(doc_id: &str, chunk_index: usize) -> PassageId {
        format!("{doc_id}:{chunk_index}")
    }
}

/// A passage with its embedding, as stored by a vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub passage: Passage,
    pub embedding: Embedding,
}

/// A search hit. Higher `score` is always more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub passage: Passage,
    pub score: f32,
}

/// Similarity metric of an index. Fixed per index and recorded on persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Cosine similarity in `[-1, 1]`.
    Cosine,
    /// Raw dot product; equals cosine for unit-length vectors.
    InnerProduct,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Cosine => write!(f, "cosine"),
            Metric::InnerProduct => write!(f, "inner_product"),
        }
    }
}

/// Identity of the vector space an index lives in.
///
/// Two indexes can only be compared, and a persisted index only reused, when
/// all three fields agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub metric: Metric,
    pub dimension: usize,
    pub embedder_id: String,
}
