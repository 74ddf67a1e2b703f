//! docqa-rag
//!
//! Retrieval-gated question answering over an indexed document corpus.
//!
//! - [`IndexBuilder`] turns documents into embedded passages in an index
//! - [`Retriever`] embeds a query and keeps matches above `min_score`
//! - [`GroundedChatEngine`] answers only from retrieved passages and
//!   refuses without calling the model when nothing relevant was found
//! - [`Pipeline`] wires all of it from an [`docqa_core::config::AppConfig`]

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod completion;
pub mod engine;
pub mod ingest;
pub mod observer;
pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use completion::OllamaCompletion;
pub use engine::{ChatTurn, GroundedChatEngine, Outcome};
pub use ingest::{BuildReport, IndexBuilder, SkippedDocument};
pub use observer::{ChatObserver, TracingObserver, TurnPhase};
pub use pipeline::{IndexStatus, Pipeline};
pub use retriever::Retriever;
pub use tokio_util::sync::CancellationToken;
