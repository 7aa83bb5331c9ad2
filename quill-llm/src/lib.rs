//! Provider-agnostic LLM integration for Quill.
//!
//! This crate exposes a common [`traits::LlmClient`] interface, the concrete
//! Anthropic Messages API implementation, the prompt templates used for
//! style analysis, and a convenience function to initialize a client from a
//! [`quill_common::LlmConfig`].
pub mod analyst;
pub mod anthropic;
pub mod prompts;
pub mod traits;

use anthropic::AnthropicClient;
use quill_common::{LlmConfig, QuillError};
use std::sync::Arc;
use traits::LlmClient;

pub use anthropic::{resolve_model, DEFAULT_ANTHROPIC_MODEL};

/// Build a ready-to-use client from the runtime provider config.
pub fn client_from_config(
    config: &LlmConfig,
) -> quill_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        LlmConfig::Anthropic {
            api_key,
            model,
            base_url,
        } => {
            let model = resolve_model(Some(model));
            let client = match base_url {
                Some(base) => AnthropicClient::with_base_url(api_key.clone(), model, base)?,
                None => AnthropicClient::new(api_key.clone(), model)?,
            };
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(QuillError::Config("No LLM configured".to_string())),
    }
}
