use crate::traits::{ChatMessage, LlmClient, LlmResponse};
use async_trait::async_trait;
use quill_common::{QuillError, Result};
use quill_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";

/// Resolve a configured model name, allowing a friendlier alias and falling
/// back to the default when unset.
pub fn resolve_model(value: Option<&str>) -> String {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_ANTHROPIC_MODEL.to_string(),
        Some("claude-3-5-sonnet") => DEFAULT_ANTHROPIC_MODEL.to_string(),
        Some(v) => v.to_string(),
    }
}

pub struct AnthropicClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One part of the response `content` array.
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl AnthropicClient {
    /// Create a new client for the given API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, ANTHROPIC_API_BASE)
    }

    /// Point the client at an alternate endpoint (gateways, tests).
    pub fn with_base_url(api_key: String, model: String, base_url: &str) -> Result<Self> {
        let client = HttpClient::new(base_url)
            .map_err(|e| QuillError::Llm(format!("HttpClient init failed: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        Ok(headers)
    }

    fn api_key_header(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(self.api_key.trim())
            .map_err(|e| QuillError::Llm(format!("invalid API key: {e}")))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        max_tokens: u32,
    ) -> Result<LlmResponse> {
        let req = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            messages,
        };

        let opts = RequestOpts {
            auth: Some(Auth::Header {
                name: HeaderName::from_static("x-api-key"),
                value: self.api_key_header()?,
            }),
            headers: Some(self.request_headers()?),
            ..Default::default()
        };

        tracing::debug!(
            model = %self.model,
            turns = messages.len(),
            has_system = system.is_some(),
            max_tokens,
            "llm.anthropic.chat"
        );

        let resp: MessagesResponse = self
            .client
            .post_json("v1/messages", &req, opts)
            .await
            .map_err(http_to_quill)?;

        let text = resp
            .content
            .iter()
            .find(|c| c.kind == "text")
            .map(|c| c.text.clone())
            .ok_or_else(|| QuillError::Llm("unexpected response type from model".to_string()))?;

        tracing::debug!(
            response_id = %resp.id,
            stop_reason = ?resp.stop_reason,
            chars = text.len(),
            "llm.anthropic.response"
        );

        Ok(LlmResponse {
            text,
            model: Some(resp.model),
            tokens_used: resp.usage.map(|u| u.input_tokens + u.output_tokens),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let test_prompt = "Respond with just 'OK'";
        match self.generate(test_prompt, None, 8).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Anthropic health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_quill(e: HttpError) -> QuillError {
    QuillError::Llm(format!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_model_defaults_and_aliases() {
        assert_eq!(resolve_model(None), DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(resolve_model(Some("  ")), DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(
            resolve_model(Some("claude-3-5-sonnet")),
            DEFAULT_ANTHROPIC_MODEL
        );
        assert_eq!(
            resolve_model(Some("claude-sonnet-4-20250514")),
            "claude-sonnet-4-20250514"
        );
    }

    #[test]
    fn request_serializes_role_tagged_turns() {
        let messages = [
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi there"),
        ];
        let req = MessagesRequest {
            model: "claude-3-5-sonnet-latest",
            max_tokens: 64,
            system: None,
            messages: &messages,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][1]["role"], "assistant");
        assert!(v.get("system").is_none());
    }
}
