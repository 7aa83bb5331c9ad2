use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use quill_common::model::Feedback;
use quill_store::{FeedbackUpdate, NewFeedback};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/feedback
pub async fn list_feedback(State(state): State<AppState>) -> ApiResult<Json<Vec<Feedback>>> {
    let feedback = state.store.list_feedback().await?;
    Ok(Json(feedback))
}

#[derive(Debug, Deserialize)]
pub struct CreateFeedbackRequest {
    pub my_text: Option<String>,
    pub editor_feedback: Option<String>,
    pub context: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /api/feedback
pub async fn create_feedback(
    State(state): State<AppState>,
    Json(body): Json<CreateFeedbackRequest>,
) -> ApiResult<(StatusCode, Json<Feedback>)> {
    let (Some(my_text), Some(editor_feedback)) = (body.my_text, body.editor_feedback) else {
        return Err(ApiError::bad_request(
            "my_text and editor_feedback are required",
        ));
    };
    if my_text.is_empty() || editor_feedback.is_empty() {
        return Err(ApiError::bad_request(
            "my_text and editor_feedback are required",
        ));
    }

    let feedback = state
        .store
        .create_feedback(NewFeedback {
            my_text,
            editor_feedback,
            context: body.context,
            tags: body.tags,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// GET /api/feedback/:id
pub async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Feedback>> {
    let feedback = state
        .store
        .get_feedback(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Feedback not found"))?;
    Ok(Json(feedback))
}

#[derive(Debug, Deserialize)]
pub struct UpdateFeedbackRequest {
    pub my_text: Option<String>,
    pub editor_feedback: Option<String>,
    pub context: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// PUT /api/feedback/:id
pub async fn update_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateFeedbackRequest>,
) -> ApiResult<Json<Feedback>> {
    let updated = state
        .store
        .update_feedback(
            &id,
            FeedbackUpdate {
                my_text: body.my_text,
                editor_feedback: body.editor_feedback,
                context: body.context,
                tags: body.tags,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Feedback not found"))?;
    Ok(Json(updated))
}

/// DELETE /api/feedback/:id
pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.store.delete_feedback(&id).await?;
    Ok(Json(json!({ "success": true })))
}
