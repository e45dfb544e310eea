pub mod contact;
pub mod health;
pub mod site;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(state.config.assets_dir());

    Router::new()
        .route("/health", get(health::health_handler))
        // Page
        .route("/", get(site::index))
        .route("/resume", get(site::resume_preview))
        .route("/resume/download", get(site::download_resume))
        // API
        .route("/api/content/reload", post(site::reload_content))
        .route("/api/notification", get(site::current_notification))
        .route("/api/contact", post(contact::submit_contact))
        .nest_service("/assets", assets)
        .fallback(site::not_found)
        .with_state(state)
}
