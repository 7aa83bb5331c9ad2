use axum::extract::State;
use axum::Json;
use quill_extract::{is_valid_url, ExtractedArticle};
use serde::Deserialize;

use super::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FetchUrlRequest {
    pub url: Option<String>,
}

/// POST /api/fetch-url
///
/// Validates the URL up front, then runs the extraction pipeline. Pipeline
/// failures surface the wrapped "URL parsing failed: ..." message.
pub async fn fetch_url(
    State(state): State<AppState>,
    Json(body): Json<FetchUrlRequest>,
) -> ApiResult<Json<ExtractedArticle>> {
    let Some(url) = body.url.filter(|u| !u.is_empty()) else {
        return Err(ApiError::bad_request("URL is required"));
    };
    if !is_valid_url(&url) {
        return Err(ApiError::bad_request("Invalid URL format"));
    }

    let article = state
        .extractor
        .fetch_and_parse_url(&url)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(article))
}
