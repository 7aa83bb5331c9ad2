//! Common types and utilities shared across Quill crates.
//!
//! This crate defines the shared error type, the provider configuration for
//! the LLM integration, and centralised observability helpers. It is
//! intentionally lightweight so that every other crate in the workspace can
//! depend on it without pulling in heavy transitive costs.
//!
//! # Overview
//!
//! - [`LlmConfig`]: Provider-agnostic LLM configuration
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`QuillError`] and [`Result`]: Shared error handling
use serde::{Deserialize, Serialize};

pub mod model;
pub mod observability;

/// Configuration for the LLM provider used by the platform.
///
/// See the `quill-llm` crate for the concrete client implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmConfig {
    Anthropic {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    None,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::None
    }
}

impl LlmConfig {
    /// Whether a usable provider is configured.
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Error types used across the Quill system.
#[derive(thiserror::Error, Debug)]
pub enum QuillError {
    /// The article-extraction pipeline failed.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The LLM provider rejected or failed a request.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The persistence layer reported an error.
    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A referenced record could not be located.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenient alias for results that use [`QuillError`].
pub type Result<T> = std::result::Result<T, QuillError>;
