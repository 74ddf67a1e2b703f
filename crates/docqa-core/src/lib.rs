//! docqa-core
//!
//! Domain types, the error taxonomy, capability traits and configuration
//! shared by every docqa crate, plus the two leaf pipeline stages: the
//! [`loader::DocumentLoader`] and the [`chunker::Chunker`].

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod error;
pub mod loader;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
