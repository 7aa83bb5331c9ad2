use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
    pub store: StoreHealth,
    pub llm: LlmHealth,
}

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LlmHealth {
    pub ok: bool,
    pub model: String,
}

/// GET /api/health
///
/// Reports store reachability and LLM configuration; `ok` only when both
/// hold. Configuration presence is checked, not provider liveness, so the
/// endpoint stays fast and free.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.store.probe().await {
        Ok(()) => StoreHealth {
            ok: true,
            error: None,
        },
        Err(e) => StoreHealth {
            ok: false,
            error: Some(e.to_string()),
        },
    };

    let llm = LlmHealth {
        ok: state.llm.is_some(),
        model: state.model_name.clone(),
    };

    let ok = store.ok && llm.ok;
    Json(HealthResponse {
        ok,
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
        llm,
    })
}
