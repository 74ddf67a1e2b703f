use std::pin::pin;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use docqa_core::chunker::Chunker;
use docqa_core::traits::{Embedder, VectorIndexer};
use docqa_core::types::{Document, IndexEntry, Passage};
use docqa_core::{Error, Result};
use docqa_embed::truncate_to_limit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub doc_id: String,
    pub reason: String,
}

/// Summary of one [`IndexBuilder::build`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Documents whose passages made it into the index.
    pub documents: usize,
    pub passages: usize,
    pub skipped: Vec<SkippedDocument>,
}

/// Chunks documents, embeds the passages and upserts them into an index.
pub struct IndexBuilder {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    concurrency: usize,
    progress: bool,
}

impl IndexBuilder {
    pub fn new(chunker: Chunker, embedder: Arc<dyn Embedder>) -> Self {
        Self { chunker, embedder, batch_size: 32, concurrency: 1, progress: false }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Index `documents` into `index`.
    ///
    /// Up to `concurrency` documents are embedded at once, but their entries
    /// are inserted in input order. A document that fails to embed is logged
    /// and reported as skipped; index errors abort the build.
    pub async fn build(&self, documents: Vec<Document>, index: &dyn VectorIndexer) -> Result<BuildReport> {
        let expected = self.embedder.index_spec();
        if index.spec() != &expected {
            return Err(Error::IndexCompatibility(format!(
                "cannot build index {:?} with embedder {:?}",
                index.spec(),
                expected
            )));
        }

        let pb = self.progress_bar(documents.len() as u64);
        let mut report = BuildReport::default();
        let mut results = pin!(stream::iter(documents)
            .map(|doc| async move {
                let entries = self.embed_document(&doc).await;
                (doc.id, entries)
            })
            .buffered(self.concurrency));

        while let Some((doc_id, entries)) = results.next().await {
            match entries {
                Ok(entries) if entries.is_empty() => {
                    tracing::debug!(doc_id, "no passages");
                }
                Ok(entries) => {
                    report.passages += entries.len();
                    report.documents += 1;
                    index.add(entries)?;
                }
                Err(e) => {
                    tracing::warn!(doc_id, error = %e, "skipping document");
                    report.skipped.push(SkippedDocument { doc_id, reason: e.to_string() });
                }
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        tracing::info!(
            documents = report.documents,
            passages = report.passages,
            skipped = report.skipped.len(),
            "index build finished"
        );
        Ok(report)
    }

    async fn embed_document(&self, doc: &Document) -> Result<Vec<IndexEntry>> {
        let passages = self.chunker.chunk(doc);
        let limit = self.embedder.max_input_chars();
        let mut entries = Vec::with_capacity(passages.len());

        for batch in passages.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|p| embeddable_text(p, limit)).collect();
            let embeddings = self.embedder.embed_many(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }
            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(embeddings)
                    .map(|(passage, embedding)| IndexEntry { passage, embedding }),
            );
        }
        Ok(entries)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%)",
        )
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}

/// Passage text cut to what the embedder accepts; the stored passage keeps
/// its full text.
fn embeddable_text(passage: &Passage, limit: usize) -> String {
    let text = truncate_to_limit(&passage.text, limit);
    if text.len() < passage.text.len() {
        tracing::warn!(passage = %passage.id, limit, "passage longer than embedder limit, truncating");
    }
    text.to_string()
}
