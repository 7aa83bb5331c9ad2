use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use quill_common::model::{Clip, ContentType};
use quill_store::{ClipFilter, ClipUpdate, NewClip};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListClipsQuery {
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    /// Comma-separated; a clip must carry every listed tag.
    pub tags: Option<String>,
}

/// GET /api/clips?contentType=url&tags=a,b
pub async fn list_clips(
    State(state): State<AppState>,
    Query(query): Query<ListClipsQuery>,
) -> ApiResult<Json<Vec<Clip>>> {
    let content_type = match query.content_type.as_deref() {
        Some(raw) => Some(
            ContentType::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("unknown contentType: {raw}")))?,
        ),
        None => None,
    };
    let tags = query
        .tags
        .map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let clips = state
        .store
        .list_clips(&ClipFilter { content_type, tags })
        .await?;
    Ok(Json(clips))
}

#[derive(Debug, Deserialize)]
pub struct CreateClipRequest {
    pub content: Option<String>,
    pub content_type: Option<String>,
    pub source_url: Option<String>,
    pub source_author: Option<String>,
    pub source_publication: Option<String>,
    #[serde(default)]
    pub user_notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub raw_html: Option<String>,
}

/// POST /api/clips
pub async fn create_clip(
    State(state): State<AppState>,
    Json(body): Json<CreateClipRequest>,
) -> ApiResult<(StatusCode, Json<Clip>)> {
    let (Some(content), Some(type_raw)) = (body.content, body.content_type) else {
        return Err(ApiError::bad_request(
            "Content and content_type are required",
        ));
    };
    if content.is_empty() {
        return Err(ApiError::bad_request(
            "Content and content_type are required",
        ));
    }
    let content_type = ContentType::parse(&type_raw)
        .ok_or_else(|| ApiError::bad_request(format!("unknown content_type: {type_raw}")))?;

    let clip = state
        .store
        .create_clip(NewClip {
            content_type,
            content,
            source_url: body.source_url,
            source_author: body.source_author,
            source_publication: body.source_publication,
            user_notes: body.user_notes,
            tags: body.tags,
            raw_html: body.raw_html,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(clip)))
}

/// GET /api/clips/:id
pub async fn get_clip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Clip>> {
    let clip = state
        .store
        .get_clip(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Clip not found"))?;
    Ok(Json(clip))
}

#[derive(Debug, Deserialize)]
pub struct UpdateClipRequest {
    pub content: Option<String>,
    pub user_notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// PUT /api/clips/:id
pub async fn update_clip(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateClipRequest>,
) -> ApiResult<Json<Clip>> {
    let updated = state
        .store
        .update_clip(
            &id,
            ClipUpdate {
                content: body.content,
                user_notes: body.user_notes,
                tags: body.tags,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Clip not found"))?;
    Ok(Json(updated))
}

/// DELETE /api/clips/:id
pub async fn delete_clip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.store.delete_clip(&id).await?;
    Ok(Json(json!({ "success": true })))
}
