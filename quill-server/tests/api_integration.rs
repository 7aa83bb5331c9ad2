use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use quill_common::{QuillError, Result as QuillResult};
use quill_extract::ArticleExtractor;
use quill_http::HttpClient;
use quill_llm::traits::{ChatMessage, LlmClient, LlmResponse};
use quill_server::{build_router, AppState};
use quill_store::StyleStore;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt;

/// LLM double that replays canned responses in order and fails once the
/// script runs out.
struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedLlm {
    fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        })
    }

    fn empty() -> Arc<Self> {
        Self::new(Vec::<String>::new())
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _system: Option<&str>,
        _max_tokens: u32,
    ) -> QuillResult<LlmResponse> {
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(text) => Ok(LlmResponse {
                text,
                model: Some("scripted".into()),
                tokens_used: None,
            }),
            None => Err(QuillError::Llm("script exhausted".into())),
        }
    }

    async fn health_check(&self) -> QuillResult<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

async fn test_state(llm: Option<Arc<dyn LlmClient + Send + Sync>>) -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = StyleStore::from_pool(pool).await.unwrap();
    let http = HttpClient::new("http://localhost/").unwrap();
    AppState::new(store, llm, ArticleExtractor::new(http), "scripted".into())
}

async fn test_app(llm: Option<Arc<dyn LlmClient + Send + Sync>>) -> (Router, AppState) {
    let state = test_state(llm).await;
    (build_router(state.clone()), state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reflects_llm_configuration() {
    let (app, _) = test_app(None).await;
    let response = app.oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["store"]["ok"], true);
    assert_eq!(body["llm"]["ok"], false);

    let (app, _) = test_app(Some(ScriptedLlm::empty())).await;
    let response = app.oneshot(get_request("/api/health")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["llm"]["model"], "scripted");
}

#[tokio::test]
async fn clip_crud_over_http() {
    let (app, _) = test_app(None).await;

    // Missing required fields
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clips",
            json!({ "content": "no type" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Content and content_type are required");

    // Create
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clips",
            json!({
                "content": "A crisp opening line.",
                "content_type": "text",
                "user_notes": "love the rhythm",
                "tags": ["openers"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["content_type"], "text");

    // List with filters
    let response = app
        .clone()
        .oneshot(get_request("/api/clips?contentType=text&tags=openers"))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get_request("/api/clips?contentType=url"))
        .await
        .unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    // Update
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/clips/{id}"),
            json!({ "user_notes": "still love it" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["user_notes"], "still love it");
    assert_eq!(updated["content"], "A crisp opening line.");

    // Delete, then 404 on fetch
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/clips/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["success"], true);

    let response = app
        .oneshot(get_request(&format!("/api/clips/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feedback_requires_both_texts() {
    let (app, _) = test_app(None).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/feedback",
            json!({ "my_text": "only half" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "my_text and editor_feedback are required");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/feedback",
            json!({
                "my_text": "utilize the tool",
                "editor_feedback": "just say use"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["editor_feedback"], "just say use");

    let response = app.oneshot(get_request("/api/feedback")).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn analyze_requires_source_material() {
    let (app, _) = test_app(Some(ScriptedLlm::empty())).await;

    let response = app
        .oneshot(json_request("POST", "/api/analyze", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No clips or feedback found. Add some first.");
}

#[tokio::test]
async fn analyze_returns_structured_fields_and_persists_a_row() {
    let reply = "The writing favors short declaratives.\n\n```json\n{\"patterns\": {\"sentence_length\": \"short\"}, \"style_elements\": {\"tone\": \"direct\"}}\n```";
    let (app, state) = test_app(Some(ScriptedLlm::new([reply]))).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clips",
            json!({ "content": "Sample.", "content_type": "text" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/api/analyze", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["patterns"]["sentence_length"], "short");
    assert_eq!(body["styleElements"]["tone"], "direct");
    assert!(body["claudeResponse"]
        .as_str()
        .unwrap()
        .contains("short declaratives"));

    let analyses = state.store.list_analyses(None).await.unwrap();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].analysis_type.as_str(), "batch");
}

#[tokio::test]
async fn style_guide_generation_flow() {
    let (app, _) = test_app(Some(ScriptedLlm::new(["# My Writing Style Guide\n\ncontent"])))
        .await;

    // No sources yet
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/style-guide", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Active guide is null before any exist
    let response = app
        .clone()
        .oneshot(get_request("/api/style-guide"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, Value::Null);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clips",
            json!({ "content": "Sample.", "content_type": "text" }),
        ))
        .await
        .unwrap();
    let clip = body_json(response).await;
    let clip_id = clip["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/style-guide",
            json!({ "clipIds": [clip_id] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let guide = body_json(response).await;
    assert_eq!(guide["title"], "My Writing Style Guide");
    assert_eq!(guide["is_active"], true);
    let guide_id = guide["id"].as_str().unwrap().to_string();

    // The new guide is the active one
    let response = app
        .clone()
        .oneshot(get_request("/api/style-guide"))
        .await
        .unwrap();
    let active = body_json(response).await;
    assert_eq!(active["id"], guide_id.as_str());

    // ?all=true returns a list
    let response = app
        .clone()
        .oneshot(get_request("/api/style-guide?all=true"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // PUT without id is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/style-guide",
            json!({ "content": "edited" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Style guide ID is required"
    );

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/style-guide",
            json!({ "id": guide_id, "content": "edited" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["content"], "edited");
    assert_eq!(updated["title"], "My Writing Style Guide");
}

#[tokio::test]
async fn chat_validates_and_masks_provider_failures() {
    let (app, _) = test_app(Some(ScriptedLlm::new(["Try tightening that intro."]))).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/chat", json!({ "messages": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "messages array is required");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/chat",
            json!({
                "messages": [{ "role": "user", "content": "How do I open stronger?" }],
                "styleGuideContent": "# Guide"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Try tightening that intro."
    );

    // Script exhausted: the provider error is masked
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/chat",
            json!({ "messages": [{ "role": "user", "content": "again?" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "Failed to process chat message"
    );
}

#[tokio::test]
async fn fetch_url_validates_before_fetching() {
    let (app, _) = test_app(None).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/fetch-url", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "URL is required");

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/fetch-url",
            json!({ "url": "ftp://example.com/file" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid URL format");
}

#[tokio::test]
async fn fetch_url_extracts_article_end_to_end() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let paragraph = "The long road to better prose begins with reading widely and editing ruthlessly. ".repeat(12);
    let html = format!(
        r#"<!DOCTYPE html>
<html><head>
<title>Fallback Title</title>
<meta property="og:title" content="Better Prose">
<meta property="og:site_name" content="The Review">
<meta name="author" content="Jane Doe">
</head><body>
<article><h1>Better Prose</h1><p>{paragraph}</p><p>{paragraph}</p></article>
</body></html>"#
    );
    Mock::given(method("GET"))
        .and(path("/essay"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let (app, _) = test_app(None).await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/fetch-url",
            json!({ "url": format!("{}/essay", server.uri()) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["content"].as_str().unwrap().contains("better prose"));
    assert_eq!(body["publication"], "The Review");
}
