//! Domain records shared by the store, the LLM layer, and the HTTP API.
//!
//! Timestamps are RFC 3339 UTC strings and ids are UUIDv4 strings; both are
//! assigned by the persistence layer on insert. Field names double as the
//! storage and wire schema.

use serde::{Deserialize, Serialize};

/// How a clip entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Url,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Url => "url",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "url" => Some(Self::Url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Individual,
    Batch,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Batch => "batch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(Self::Individual),
            "batch" => Some(Self::Batch),
            _ => None,
        }
    }
}

/// A stored writing sample the user wants to emulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    pub created_at: String,
    pub content_type: ContentType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_publication: Option<String>,
    pub user_notes: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,
}

/// A (user's original text, editor's correction) pair used as a negative
/// example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub created_at: String,
    pub my_text: String,
    pub editor_feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub tags: Vec<String>,
}

/// A stored LLM analysis run over one or more clips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: String,
    pub created_at: String,
    pub clip_id: String,
    pub analysis_type: AnalysisType,
    pub patterns: serde_json::Value,
    pub style_elements: serde_json::Value,
    pub claude_response: String,
}

/// A generated/edited markdown style guide; at most one is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleGuide {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub title: String,
    pub content: String,
    pub based_on_clip_ids: Vec<String>,
    pub is_active: bool,
}
