//! docqa-vector
//!
//! Exact similarity search over passage embeddings and its persistence.
//!
//! [`FlatIndex`] implements [`docqa_core::traits::VectorIndexer`] with a
//! brute-force scan; callers hold it behind that trait so an approximate
//! structure can replace it without touching retrieval. Persistence goes
//! through the [`BlobStore`] seam and records the index's metric, dimension
//! and embedder so a mismatched index is refused at load time.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod flat;
pub mod persist;
pub mod similarity;
pub mod store;

pub use flat::FlatIndex;
pub use persist::Manifest;
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore};
