use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use quill_common::model::StyleGuide;
use quill_llm::analyst;
use quill_store::{NewStyleGuide, StyleGuideUpdate};
use serde::Deserialize;
use serde_json::Value;

use super::analyze::{resolve_clips, resolve_feedback};
use super::{require_llm, ApiError, ApiResult};
use crate::AppState;

const DEFAULT_GUIDE_TITLE: &str = "My Writing Style Guide";

#[derive(Debug, Deserialize)]
pub struct GetGuideQuery {
    #[serde(default)]
    pub all: Option<String>,
}

/// GET /api/style-guide — the active guide (JSON `null` when none exists),
/// or every guide newest-first with `?all=true`.
pub async fn get_style_guide(
    State(state): State<AppState>,
    Query(query): Query<GetGuideQuery>,
) -> ApiResult<Json<Value>> {
    if query.all.as_deref() == Some("true") {
        let guides = state.store.all_style_guides().await?;
        return Ok(Json(serde_json::to_value(guides).map_err(|e| {
            ApiError::internal(e.to_string())
        })?));
    }
    let active = state.store.active_style_guide().await?;
    Ok(Json(
        serde_json::to_value(active).map_err(|e| ApiError::internal(e.to_string()))?,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuideRequest {
    #[serde(default)]
    pub clip_ids: Vec<String>,
    #[serde(default)]
    pub feedback_ids: Vec<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub include_feedback: bool,
}

/// POST /api/style-guide
///
/// Generates a new guide from the referenced clips and feedback (explicit
/// ids only here; no fall-back to "all") plus every stored analysis, then
/// persists it as the single active guide.
pub async fn create_style_guide(
    State(state): State<AppState>,
    Json(body): Json<CreateGuideRequest>,
) -> ApiResult<(StatusCode, Json<StyleGuide>)> {
    let clips = if body.clip_ids.is_empty() {
        Vec::new()
    } else {
        resolve_clips(&state, &body.clip_ids).await?
    };
    let feedback = if body.include_feedback && !body.feedback_ids.is_empty() {
        resolve_feedback(&state, &body.feedback_ids).await?
    } else {
        Vec::new()
    };

    if clips.is_empty() && feedback.is_empty() {
        return Err(ApiError::bad_request(
            "At least one clip or feedback item is required",
        ));
    }

    let analyses = state.store.list_analyses(None).await?;

    let llm = require_llm(&state)?;
    let content = analyst::generate_style_guide(llm.as_ref(), &clips, &analyses, &feedback)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let guide = state
        .store
        .create_style_guide(NewStyleGuide {
            title: body
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_GUIDE_TITLE.to_string()),
            content,
            based_on_clip_ids: body.clip_ids,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(guide)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGuideRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_active: Option<bool>,
}

/// PUT /api/style-guide
pub async fn update_style_guide(
    State(state): State<AppState>,
    Json(body): Json<UpdateGuideRequest>,
) -> ApiResult<Json<StyleGuide>> {
    let Some(id) = body.id else {
        return Err(ApiError::bad_request("Style guide ID is required"));
    };

    let updated = state
        .store
        .update_style_guide(
            &id,
            StyleGuideUpdate {
                title: body.title,
                content: body.content,
                is_active: body.is_active,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Style guide not found"))?;
    Ok(Json(updated))
}
