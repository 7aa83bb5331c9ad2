use axum::extract::State;
use axum::Json;
use quill_common::model::{AnalysisType, Clip, Feedback};
use quill_llm::analyst;
use quill_store::{ClipFilter, NewAnalysis};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{require_llm, ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub clip_ids: Vec<String>,
    #[serde(default)]
    pub feedback_ids: Vec<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub include_feedback: bool,
}

/// POST /api/analyze
///
/// Runs the combined good-examples/mistakes analysis. Empty id lists mean
/// "use everything"; feedback participates only when `includeFeedback` is
/// set. The result is persisted as an `Analysis` row when at least one clip
/// took part.
pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> ApiResult<Json<Value>> {
    let clips = resolve_clips(&state, &body.clip_ids).await?;
    let feedback = if body.include_feedback {
        resolve_feedback(&state, &body.feedback_ids).await?
    } else {
        Vec::new()
    };

    if clips.is_empty() && feedback.is_empty() {
        return Err(ApiError::bad_request(
            "No clips or feedback found. Add some first.",
        ));
    }

    let llm = require_llm(&state)?;
    let result = analyst::analyze_writing(llm.as_ref(), &clips, &feedback, &body.focus_areas)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    if let Some(first) = clips.first() {
        state
            .store
            .create_analysis(NewAnalysis {
                clip_id: first.id.clone(),
                analysis_type: AnalysisType::Batch,
                patterns: result.patterns.clone(),
                style_elements: result.style_elements.clone(),
                claude_response: result.prose.clone(),
            })
            .await?;
    }

    Ok(Json(json!({
        "patterns": result.patterns,
        "styleElements": result.style_elements,
        "claudeResponse": result.prose,
    })))
}

pub(crate) async fn resolve_clips(state: &AppState, ids: &[String]) -> ApiResult<Vec<Clip>> {
    if ids.is_empty() {
        return Ok(state.store.list_clips(&ClipFilter::default()).await?);
    }
    let mut clips = Vec::with_capacity(ids.len());
    for id in ids {
        let clip = state
            .store
            .get_clip(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Clip not found: {id}")))?;
        clips.push(clip);
    }
    Ok(clips)
}

pub(crate) async fn resolve_feedback(state: &AppState, ids: &[String]) -> ApiResult<Vec<Feedback>> {
    if ids.is_empty() {
        return Ok(state.store.list_feedback().await?);
    }
    let mut items = Vec::with_capacity(ids.len());
    for id in ids {
        let fb = state
            .store
            .get_feedback(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Feedback not found: {id}")))?;
        items.push(fb);
    }
    Ok(items)
}
