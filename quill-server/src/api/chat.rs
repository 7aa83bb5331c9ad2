use axum::extract::State;
use axum::Json;
use quill_llm::prompts;
use quill_llm::traits::ChatMessage;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{require_llm, ApiError, ApiResult};
use crate::AppState;

const CHAT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub style_guide_content: Option<String>,
}

/// POST /api/chat
///
/// Relays the conversation to the coach with the style guide embedded in
/// the system prompt. Provider failures are masked behind one generic
/// message; the detail goes to the log, not the client.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> ApiResult<Json<Value>> {
    if body.messages.is_empty() {
        return Err(ApiError::bad_request("messages array is required"));
    }

    let llm = require_llm(&state)?;
    let system = prompts::chat_system_prompt(body.style_guide_content.as_deref());

    let response = llm
        .chat(&body.messages, Some(&system), CHAT_MAX_TOKENS)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "chat.llm_failed");
            ApiError::internal("Failed to process chat message")
        })?;

    Ok(Json(json!({ "message": response.text })))
}
