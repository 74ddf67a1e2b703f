use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use docqa_core::config::ChatConfig;
use docqa_core::traits::{CompletionModel, CompletionRequest};
use docqa_core::types::ScoredMatch;
use docqa_core::{Error, Result};

use crate::observer::{ChatObserver, TurnPhase};
use crate::prompt::{build_context, is_dont_know};
use crate::retriever::Retriever;

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing passed the relevance threshold; completion was not called.
    NoEvidence,
    /// Completion ran but returned the sentinel or nothing.
    InsufficientEvidence,
    Answered(String),
}

impl Outcome {
    pub fn is_refusal(&self) -> bool {
        !matches!(self, Outcome::Answered(_))
    }
}

/// Everything produced by one chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub query: String,
    pub matches: Vec<ScoredMatch>,
    /// The exact context handed to completion; empty for [`Outcome::NoEvidence`].
    pub context: String,
    pub outcome: Outcome,
}

impl ChatTurn {
    pub fn scores(&self) -> Vec<f32> {
        self.matches.iter().map(|m| m.score).collect()
    }

    /// User-facing text for this turn.
    pub fn render(&self, config: &ChatConfig) -> String {
        match &self.outcome {
            Outcome::NoEvidence => config.no_evidence_message.clone(),
            Outcome::InsufficientEvidence => config.insufficient_evidence_message.clone(),
            Outcome::Answered(answer) => {
                let scores: Vec<String> = self.scores().iter().map(|s| format!("{s:.4}")).collect();
                format!("ANSWER... [{}]\n{answer}", scores.join(", "))
            }
        }
    }
}

/// Retrieval-gated chat: completion only ever sees retrieved passages, and
/// is skipped entirely when retrieval finds none.
pub struct GroundedChatEngine {
    retriever: Retriever,
    completion: Arc<dyn CompletionModel>,
    config: ChatConfig,
    observers: Vec<Arc<dyn ChatObserver>>,
}

impl GroundedChatEngine {
    pub fn new(retriever: Retriever, completion: Arc<dyn CompletionModel>, config: ChatConfig) -> Self {
        Self { retriever, completion, config, observers: Vec::new() }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ChatObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Run one turn. Turns are independent: nothing is carried between calls.
    ///
    /// Cancelling `cancel` abandons the in-flight embedding or completion
    /// call and yields [`Error::Cancelled`].
    pub async fn chat(&self, query: &str, cancel: &CancellationToken) -> Result<ChatTurn> {
        let result = self.run_turn(query, cancel).await;
        self.phase(TurnPhase::AwaitingQuery);
        result
    }

    async fn run_turn(&self, query: &str, cancel: &CancellationToken) -> Result<ChatTurn> {
        self.phase(TurnPhase::Retrieving);
        let matches = until_cancelled(cancel, self.retriever.retrieve_query(query)).await?;
        for o in &self.observers {
            o.on_retrieved(query, &matches);
        }

        if matches.is_empty() {
            self.phase(TurnPhase::Refusing);
            tracing::info!(query, "no passage above threshold");
            return Ok(ChatTurn {
                query: query.to_string(),
                matches,
                context: String::new(),
                outcome: Outcome::NoEvidence,
            });
        }

        let request = CompletionRequest {
            system_prompt: self.config.system_prompt.clone(),
            context: build_context(&matches),
            query: query.to_string(),
        };
        for o in &self.observers {
            o.on_completion_request(&request);
        }
        let answer = until_cancelled(cancel, self.completion.complete(&request)).await?;
        for o in &self.observers {
            o.on_completion(&answer);
        }

        let outcome = if is_dont_know(&answer, &self.config.dont_know_sentinel) {
            self.phase(TurnPhase::Refusing);
            Outcome::InsufficientEvidence
        } else {
            self.phase(TurnPhase::Answering);
            Outcome::Answered(answer.trim().to_string())
        };
        Ok(ChatTurn { query: request.query, matches, context: request.context, outcome })
    }

    fn phase(&self, phase: TurnPhase) {
        for o in &self.observers {
            o.on_phase(phase);
        }
    }
}

async fn until_cancelled<T>(cancel: &CancellationToken, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
