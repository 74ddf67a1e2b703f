//! Optional hooks around a chat turn, for logging and diagnostics only.

use docqa_core::traits::CompletionRequest;
use docqa_core::types::ScoredMatch;

/// Where a chat turn is.
///
/// `AwaitingQuery -> Retrieving -> Answering | Refusing -> AwaitingQuery`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingQuery,
    Retrieving,
    Answering,
    Refusing,
}

/// Every hook has a no-op default; implement the ones you need.
pub trait ChatObserver: Send + Sync {
    fn on_phase(&self, _phase: TurnPhase) {}
    fn on_retrieved(&self, _query: &str, _matches: &[ScoredMatch]) {}
    fn on_completion_request(&self, _request: &CompletionRequest) {}
    fn on_completion(&self, _answer: &str) {}
}

/// Forwards every hook to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ChatObserver for TracingObserver {
    fn on_phase(&self, phase: TurnPhase) {
        tracing::debug!(?phase, "chat phase");
    }

    fn on_retrieved(&self, query: &str, matches: &[ScoredMatch]) {
        let scores: Vec<f32> = matches.iter().map(|m| m.score).collect();
        tracing::debug!(query, hits = matches.len(), ?scores, "retrieved");
    }

    fn on_completion_request(&self, request: &CompletionRequest) {
        tracing::debug!(context_chars = request.context.len(), query = %request.query, "calling completion");
    }

    fn on_completion(&self, answer: &str) {
        tracing::debug!(answer, "completion returned");
    }
}
