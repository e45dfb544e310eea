//! Page, preview, and download handlers.

use axum::{
    extract::State,
    http::{header, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::content::projection::ProjectionReport;
use crate::errors::AppError;
use crate::notify::Notification;
use crate::state::AppState;

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.read().await.render())
}

/// GET /resume
/// The page with the resume preview modal mounted.
pub async fn resume_preview(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let doc = state.document().await?;
    let mut page = state.page.read().await.clone();
    state.resume.preview(&mut page, &doc)?;
    Ok(Html(page.render()))
}

/// GET /resume/download
pub async fn download_resume(State(state): State<AppState>) -> Result<Response, AppError> {
    let doc = state.document().await?;
    let artifact = state.resume.download(doc).await?;
    info!(file_name = %artifact.file_name, "Serving resume download");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        artifact.file_name.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}

/// POST /api/content/reload
/// Re-fetches the document. On failure the page keeps its current markup.
pub async fn reload_content(
    State(state): State<AppState>,
) -> Result<Json<ProjectionReport>, AppError> {
    state
        .reload()
        .await
        .map(Json)
        .map_err(|e| AppError::ContentUnavailable(e.to_string()))
}

/// GET /api/notification
pub async fn current_notification(State(state): State<AppState>) -> Json<Option<Notification>> {
    Json(state.notifier.current())
}

/// Fallback for unrouted paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No page at {}", uri.path()))
}
