#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use docqa_core::traits::{CompletionModel, CompletionRequest, Embedder};
use docqa_core::types::{Document, Embedding, Metric};
use docqa_core::{Error, Result};

pub const SENTINEL: &str = "I don't know. It's not in my files";

/// One dimension per vocabulary word, counting occurrences.
///
/// Text with none of the words embeds to the zero vector, which scores 0
/// against everything. Text containing `poison` fails to embed.
pub struct KeywordEmbedder {
    vocab: Vec<&'static str>,
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            vocab: vec!["france", "paris", "capital", "dragon", "fire", "breath", "egg", "flour", "pancake"],
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn embedder_id(&self) -> &str {
        "keyword:test"
    }

    fn dimension(&self) -> usize {
        self.vocab.len()
    }

    fn metric(&self) -> Metric {
        Metric::Cosine
    }

    fn max_input_chars(&self) -> usize {
        10_000
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        if lower.contains("poison") {
            return Err(Error::Embedding("refusing poisoned input".into()));
        }
        let mut v = vec![0.0; self.vocab.len()];
        for token in lower.split(|c: char| !c.is_alphanumeric()) {
            if let Some(i) = self.vocab.iter().position(|w| *w == token) {
                v[i] += 1.0;
            }
        }
        Ok(v)
    }
}

pub enum Reply {
    Text(String),
    Fail,
    Hang,
}

/// Completion that returns a fixed reply and records every request.
pub struct ScriptedCompletion {
    reply: Reply,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self { reply: Reply::Text(text.to_string()), requests: Mutex::new(Vec::new()) })
    }

    pub fn with(reply: Reply) -> Arc<Self> {
        Arc::new(Self { reply, requests: Mutex::new(Vec::new()) })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl CompletionModel for ScriptedCompletion {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().push(request.clone());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(Error::Completion("model unavailable".into())),
            Reply::Hang => std::future::pending::<Result<String>>().await,
        }
    }
}

pub fn doc(id: &str, text: &str) -> Document {
    Document { id: id.to_string(), path: format!("/corpus/{id}").into(), text: text.to_string() }
}

pub fn corpus() -> Vec<Document> {
    vec![
        doc("geography.txt", "Paris is the capital of France."),
        doc("monsters.md", "A red dragon attacks with fire breath."),
    ]
}
