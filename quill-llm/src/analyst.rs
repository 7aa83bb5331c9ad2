//! High-level analysis calls with a structured-output contract.
//!
//! The analysis prompt asks the model to append a fenced JSON block holding
//! `patterns` and `style_elements` maps. Parsing that block is best-effort:
//! the prose is the primary artifact, so a missing or malformed block
//! degrades to empty objects instead of failing the whole analysis.

use quill_common::model::{Analysis, Clip, Feedback};
use quill_common::Result;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::prompts;
use crate::traits::LlmClient;

const ANALYSIS_MAX_TOKENS: u32 = 8192;
const STYLE_GUIDE_MAX_TOKENS: u32 = 8192;

const STRUCTURED_OUTPUT_SUFFIX: &str = r#"

After the analysis, append a fenced ```json code block containing exactly one object of the form {"patterns": {...}, "style_elements": {...}}, where both values are flat maps from short snake_case keys to one-line string findings."#;

/// Result of one analysis run: the full prose response plus the structured
/// summary scraped from its trailing JSON block.
#[derive(Debug, Clone)]
pub struct StyleAnalysis {
    pub prose: String,
    pub patterns: Value,
    pub style_elements: Value,
}

/// Run the combined good-examples/mistakes analysis.
pub async fn analyze_writing(
    llm: &dyn LlmClient,
    clips: &[Clip],
    feedback: &[Feedback],
    focus_areas: &[String],
) -> Result<StyleAnalysis> {
    let prompt = format!(
        "{}{}",
        prompts::combined_analysis_prompt(clips, feedback, focus_areas),
        STRUCTURED_OUTPUT_SUFFIX
    );

    tracing::info!(
        clips = clips.len(),
        feedback = feedback.len(),
        focus_areas = focus_areas.len(),
        "llm.analyze_writing.start"
    );

    let response = llm.generate(&prompt, None, ANALYSIS_MAX_TOKENS).await?;
    let (patterns, style_elements) = parse_structured_block(&response.text);

    Ok(StyleAnalysis {
        prose: response.text,
        patterns,
        style_elements,
    })
}

/// Generate the markdown style guide from analyses, clips, and feedback.
pub async fn generate_style_guide(
    llm: &dyn LlmClient,
    clips: &[Clip],
    analyses: &[Analysis],
    feedback: &[Feedback],
) -> Result<String> {
    let prompt = prompts::style_guide_prompt(clips, analyses, feedback);

    tracing::info!(
        clips = clips.len(),
        analyses = analyses.len(),
        feedback = feedback.len(),
        "llm.generate_style_guide.start"
    );

    let response = llm.generate(&prompt, None, STYLE_GUIDE_MAX_TOKENS).await?;
    Ok(response.text)
}

/// Wire shape of the model's structured block.
#[derive(Debug, Deserialize)]
struct StructuredBlock {
    #[serde(default)]
    patterns: Value,
    #[serde(default)]
    style_elements: Value,
}

fn parse_structured_block(text: &str) -> (Value, Value) {
    let Some(json_str) = extract_json_block(text) else {
        tracing::warn!("llm.structured_block.missing");
        return (empty_object(), empty_object());
    };

    match serde_json::from_str::<StructuredBlock>(&json_str) {
        Ok(block) => (
            object_or_empty(block.patterns),
            object_or_empty(block.style_elements),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "llm.structured_block.unparseable");
            (empty_object(), empty_object())
        }
    }
}

/// Try to extract a ```json … ``` fenced block; fall back to the last bare
/// object in the text.
fn extract_json_block(text: &str) -> Option<String> {
    let re_fence = Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").ok()?;
    if let Some(caps) = re_fence.captures(text) {
        return Some(caps.get(1)?.as_str().to_string());
    }
    let re_plain = Regex::new(r"(?s)(\{.*\})").ok()?;
    re_plain
        .captures(text)
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn object_or_empty(v: Value) -> Value {
    if v.is_object() {
        v
    } else {
        empty_object()
    }
}
