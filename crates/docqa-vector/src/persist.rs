//! Index persistence through a [`BlobStore`].
//!
//! Two blobs are written, entries first so a readable manifest always has
//! its entries next to it:
//! - `entries.json`: every [`IndexEntry`] in slot order
//! - `manifest.json`: metric, dimension, embedder id and entry count

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docqa_core::traits::VectorIndexer;
use docqa_core::types::{IndexEntry, IndexSpec};
use docqa_core::{Error, Result};

use crate::flat::FlatIndex;
use crate::store::BlobStore;

pub const MANIFEST_KEY: &str = "manifest.json";
pub const ENTRIES_KEY: &str = "entries.json";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    #[serde(flatten)]
    pub spec: IndexSpec,
    pub entry_count: usize,
    pub persisted_at: DateTime<Utc>,
}

impl Manifest {
    /// Why `self` cannot be served by an embedder producing `expected`, if it can't.
    fn incompatibility(&self, expected: &IndexSpec) -> Option<String> {
        if self.format_version != FORMAT_VERSION {
            return Some(format!(
                "format version {} (supported: {FORMAT_VERSION})",
                self.format_version
            ));
        }
        if self.spec.metric != expected.metric {
            return Some(format!(
                "index metric is {}, embedder uses {}",
                self.spec.metric, expected.metric
            ));
        }
        if self.spec.dimension != expected.dimension {
            return Some(format!(
                "index dimension is {}, embedder produces {}",
                self.spec.dimension, expected.dimension
            ));
        }
        if self.spec.embedder_id != expected.embedder_id {
            return Some(format!(
                "index was built by {}, active embedder is {}",
                self.spec.embedder_id, expected.embedder_id
            ));
        }
        None
    }
}

impl FlatIndex {
    /// Write the index to `store`, replacing whatever was there.
    pub fn persist(&self, store: &dyn BlobStore) -> Result<Manifest> {
        let entries = self.entries();
        let manifest = Manifest {
            format_version: FORMAT_VERSION,
            spec: self.spec().clone(),
            entry_count: entries.len(),
            persisted_at: Utc::now(),
        };

        let entries_json = serde_json::to_vec(&entries)
            .map_err(|e| Error::Storage(format!("serialize entries: {e}")))?;
        let manifest_json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| Error::Storage(format!("serialize manifest: {e}")))?;
        store.put(ENTRIES_KEY, &entries_json)?;
        store.put(MANIFEST_KEY, &manifest_json)?;

        tracing::info!(entries = manifest.entry_count, location = %store.location(), "persisted index");
        Ok(manifest)
    }

    /// Read an index from `store`.
    ///
    /// An empty store yields an empty index for `expected`. A stored index
    /// whose metric, dimension or embedder differs from `expected` is an
    /// [`Error::IndexCompatibility`]; it is never searched.
    pub fn load(store: &dyn BlobStore, expected: &IndexSpec) -> Result<Self> {
        let Some(manifest_bytes) = store.get(MANIFEST_KEY)? else {
            tracing::info!(location = %store.location(), "no persisted index, starting empty");
            return Ok(FlatIndex::new(expected.clone()));
        };
        let manifest: Manifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| Error::Storage(format!("malformed {MANIFEST_KEY}: {e}")))?;
        if let Some(reason) = manifest.incompatibility(expected) {
            return Err(Error::IndexCompatibility(format!("{}: {reason}", store.location())));
        }

        let entries_bytes = store.get(ENTRIES_KEY)?.ok_or_else(|| {
            Error::Storage(format!("{} has a manifest but no {ENTRIES_KEY}", store.location()))
        })?;
        let entries: Vec<IndexEntry> = serde_json::from_slice(&entries_bytes)
            .map_err(|e| Error::Storage(format!("malformed {ENTRIES_KEY}: {e}")))?;
        if entries.len() != manifest.entry_count {
            return Err(Error::Storage(format!(
                "manifest lists {} entries, found {}",
                manifest.entry_count,
                entries.len()
            )));
        }

        let index = FlatIndex::new(manifest.spec);
        index.add(entries)?;
        tracing::info!(entries = index.len(), location = %store.location(), "loaded index");
        Ok(index)
    }
}
