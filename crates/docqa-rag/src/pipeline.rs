use std::collections::HashSet;
use std::sync::Arc;

use docqa_core::chunker::Chunker;
use docqa_core::config::{expand_path, AppConfig};
use docqa_core::loader::DocumentLoader;
use docqa_core::traits::{CompletionModel, Embedder, VectorIndexer};
use docqa_core::types::IndexSpec;
use docqa_core::{Error, Result};
use docqa_embed::get_embedder;
use docqa_vector::{BlobStore, FlatIndex, FsBlobStore};

use crate::completion::OllamaCompletion;
use crate::engine::GroundedChatEngine;
use crate::ingest::{BuildReport, IndexBuilder};
use crate::observer::TracingObserver;
use crate::retriever::Retriever;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    pub location: String,
    pub spec: IndexSpec,
    pub documents: usize,
    pub passages: usize,
}

/// Configured components plus the currently loaded index.
pub struct Pipeline {
    config: AppConfig,
    embedder: Arc<dyn Embedder>,
    completion: Arc<dyn CompletionModel>,
    store: Box<dyn BlobStore>,
    index: Arc<FlatIndex>,
}

impl Pipeline {
    /// Embedder and completion from config, index from `data.index_dir`.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let (embedder, completion, store) = Self::components(&config)?;
        Self::with_components(config, embedder, completion, store)
    }

    /// Like [`Pipeline::from_config`] but starts from an empty index without
    /// reading the persisted one, so an index built by a different embedder
    /// can be replaced by [`Pipeline::ingest`].
    pub fn rebuilding(config: AppConfig) -> Result<Self> {
        let (embedder, completion, store) = Self::components(&config)?;
        let index = Arc::new(FlatIndex::new(embedder.index_spec()));
        Ok(Self { config, embedder, completion, store, index })
    }

    fn components(
        config: &AppConfig,
    ) -> Result<(Arc<dyn Embedder>, Arc<dyn CompletionModel>, Box<dyn BlobStore>)> {
        config.validate()?;
        let embedder = get_embedder(&config.embedding)?;
        let completion: Arc<dyn CompletionModel> = Arc::new(OllamaCompletion::new(&config.completion)?);
        let store: Box<dyn BlobStore> = Box::new(FsBlobStore::new(expand_path(&config.data.index_dir)));
        Ok((embedder, completion, store))
    }

    /// Loads whatever `store` holds. A persisted index built for another
    /// embedder, dimension or metric is an error, never silently reused.
    pub fn with_components(
        config: AppConfig,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionModel>,
        store: Box<dyn BlobStore>,
    ) -> Result<Self> {
        let index = FlatIndex::load(store.as_ref(), &embedder.index_spec())?;
        tracing::info!(
            location = %store.location(),
            passages = index.len(),
            embedder = embedder.embedder_id(),
            "index loaded"
        );
        Ok(Self { config, embedder, completion, store, index: Arc::new(index) })
    }

    pub fn index(&self) -> Arc<FlatIndex> {
        Arc::clone(&self.index)
    }

    /// Rebuild the index from `data.source_dir` and persist it.
    ///
    /// The new index replaces the loaded one only after it has been
    /// persisted; engines created earlier keep the index they were given.
    /// When documents were found but none could be embedded the build fails
    /// with [`Error::Embedding`] and the current index stays in place.
    pub async fn ingest(&mut self) -> Result<BuildReport> {
        let source = expand_path(&self.config.data.source_dir);
        let loader = DocumentLoader::new(self.config.data.extensions.clone());
        tracing::info!(source = %source.display(), "loading documents");
        let documents = tokio::task::spawn_blocking(move || loader.load(&source))
            .await
            .map_err(|e| Error::Load(format!("loader task failed: {e}")))??;
        if documents.is_empty() {
            tracing::warn!("no documents found, the index will be empty");
        }

        let builder = IndexBuilder::new(Chunker::new(self.config.chunking.clone())?, Arc::clone(&self.embedder))
            .batch_size(self.config.embedding.batch_size)
            .concurrency(self.config.ingest.concurrency)
            .progress(self.config.ingest.progress);
        let index = FlatIndex::new(self.embedder.index_spec());
        let report = builder.build(documents, &index).await?;
        if report.documents == 0 {
            if let Some(first) = report.skipped.first() {
                return Err(Error::Embedding(format!(
                    "none of {} documents could be indexed, keeping the current index ({}: {})",
                    report.skipped.len(),
                    first.doc_id,
                    first.reason
                )));
            }
        }

        let manifest = index.persist(self.store.as_ref())?;
        tracing::info!(location = %self.store.location(), entries = manifest.entry_count, "index persisted");
        self.index = Arc::new(index);
        Ok(report)
    }

    /// A chat engine over the current index.
    pub fn engine(&self) -> Result<GroundedChatEngine> {
        let index: Arc<dyn VectorIndexer> = self.index();
        let retriever = Retriever::new(Arc::clone(&self.embedder), index, self.config.retrieval.clone())?;
        Ok(GroundedChatEngine::new(retriever, Arc::clone(&self.completion), self.config.chat.clone())
            .with_observer(Arc::new(TracingObserver)))
    }

    pub fn status(&self) -> IndexStatus {
        let entries = self.index.entries();
        let documents = entries.iter().map(|e| e.passage.doc_id.as_str()).collect::<HashSet<_>>().len();
        IndexStatus {
            location: self.store.location(),
            spec: self.index.spec().clone(),
            documents,
            passages: entries.len(),
        }
    }
}
