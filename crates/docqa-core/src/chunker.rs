use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Document, Passage};

/// Splits documents into overlapping word-aligned passages.
///
/// Sizes are counted in characters. Consecutive passages share up to
/// `overlap_chars` of whole words; each passage still adds at least one word
/// the previous one did not have.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn chunk(&self, document: &Document) -> Vec<Passage> {
        let spans = self.split_text(&document.text);
        let total_chunks = spans.len();
        let doc_path = document.path.to_string_lossy().to_string();
        spans
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Passage {
                id: Passage::make_id(&document.id, chunk_index),
                doc_id: document.id.clone(),
                doc_path: doc_path.clone(),
                text,
                chunk_index,
                total_chunks,
            })
            .collect()
    }

    /// The passage texts for `text`, in order. Never contains an empty string.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let max = self.config.max_chars;
        let pieces: Vec<&str> = text
            .split_whitespace()
            .flat_map(|word| split_long_word(word, max))
            .collect();
        let lens: Vec<usize> = pieces.iter().map(|p| p.chars().count()).collect();

        let mut passages = Vec::new();
        let mut start = 0;
        while start < pieces.len() {
            let mut end = start;
            let mut len = 0;
            while end < pieces.len() {
                let add = lens[end] + usize::from(end > start);
                if end > start && len + add > max {
                    break;
                }
                len += add;
                end += 1;
            }
            passages.push(pieces[start..end].join(" "));
            if end == pieces.len() {
                break;
            }

            // Leave room for at least the next unseen piece.
            let budget = self
                .config
                .overlap_chars
                .min(max.saturating_sub(lens[end] + 1));
            let mut next = end;
            let mut overlap = 0;
            while next > start + 1 {
                let add = lens[next - 1] + usize::from(overlap > 0);
                if overlap + add > budget {
                    break;
                }
                overlap += add;
                next -= 1;
            }
            start = next;
        }
        passages
    }
}

/// Hard-split a word longer than `max` characters on char boundaries.
fn split_long_word(word: &str, max: usize) -> Vec<&str> {
    if word.chars().count() <= max {
        return vec![word];
    }
    let mut out = Vec::new();
    let mut begin = 0;
    for (count, (idx, _)) in word.char_indices().enumerate() {
        if count > 0 && count % max == 0 {
            out.push(&word[begin..idx]);
            begin = idx;
        }
    }
    out.push(&word[begin..]);
    out
}
