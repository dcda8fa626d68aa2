//! RAGGuard-LLM: Completion Transport for RAGGuard
//!
//! This crate owns every exchange with the language-model completion
//! endpoint. The reasoning core only ever sees the [`CompletionClient`]
//! trait, so endpoints can be swapped (or faked) without touching it.
//!
//! ## Layer 0 - Transport
//!
//! Focus: Deterministic single-turn requests and honest failure reporting.
//!
//! ## Key Components
//!
//! - `CompletionClient`: async trait consumed by the reasoning stages
//! - `CompletionRequest`: prompt + model + pinned temperature
//! - `OpenAiCompatClient`: `reqwest` client for `/chat/completions` endpoints
//! - `CompletionConfig`: explicit endpoint configuration
//! - `fakes::ScriptedCompletionClient`: in-memory client for tests

mod client;
mod config;
mod error;
pub mod fakes;

pub use client::{
    CompletionClient, CompletionRequest, OpenAiCompatClient, DETERMINISTIC_TEMPERATURE,
};
pub use config::CompletionConfig;
pub use error::TransportError;

/// Result type for completion transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
