//! HTTP API for the style-guide service.
//!
//! One axum router serves clips, feedback, analyses, style guides, the chat
//! coach, the article extractor, and a health probe. Handlers stay thin:
//! validation and status-code mapping live here, everything else is
//! delegated to the store, extractor, and LLM crates.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use quill_extract::ArticleExtractor;
use quill_llm::traits::LlmClient;
use quill_store::StyleStore;
use tower_http::trace::TraceLayer;

pub mod api;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: StyleStore,
    /// Absent when no provider is configured; LLM-backed routes then fail
    /// with a configuration error while the rest of the API keeps working.
    pub llm: Option<Arc<dyn LlmClient + Send + Sync>>,
    pub extractor: ArticleExtractor,
    /// Model name reported by the health endpoint.
    pub model_name: String,
}

impl AppState {
    pub fn new(
        store: StyleStore,
        llm: Option<Arc<dyn LlmClient + Send + Sync>>,
        extractor: ArticleExtractor,
        model_name: String,
    ) -> Self {
        Self {
            store,
            llm,
            extractor,
            model_name,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(api::health::health_check))
        .route(
            "/api/clips",
            get(api::clips::list_clips).post(api::clips::create_clip),
        )
        .route(
            "/api/clips/:id",
            get(api::clips::get_clip)
                .put(api::clips::update_clip)
                .delete(api::clips::delete_clip),
        )
        .route(
            "/api/feedback",
            get(api::feedback::list_feedback).post(api::feedback::create_feedback),
        )
        .route(
            "/api/feedback/:id",
            get(api::feedback::get_feedback)
                .put(api::feedback::update_feedback)
                .delete(api::feedback::delete_feedback),
        )
        .route(
            "/api/style-guide",
            get(api::style_guide::get_style_guide)
                .post(api::style_guide::create_style_guide)
                .put(api::style_guide::update_style_guide),
        )
        .route("/api/analyze", post(api::analyze::analyze))
        .route("/api/chat", post(api::chat::chat))
        .route("/api/fetch-url", post(api::extract::fetch_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
