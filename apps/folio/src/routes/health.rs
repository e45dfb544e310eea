use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and content readiness.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let content_loaded = state.loader.store().current().await.is_some();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "folio",
        "content_loaded": content_loaded,
        "generator_ready": state.resume.provider().is_ready()
    }))
}
