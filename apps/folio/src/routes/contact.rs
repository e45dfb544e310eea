use axum::Json;
use tracing::info;

use crate::contact::{ContactSubmission, CONTACT_THANKS_MESSAGE};
use crate::errors::AppError;
use crate::notify::{Notification, NotificationKind};

/// POST /api/contact
/// Validates the submission and acknowledges it. Nothing is stored.
///
/// The outcome goes back to the submitting visitor only: the notification on
/// success, the `{"error":...}` body on failure. The shared notification
/// center is not touched.
pub async fn submit_contact(
    Json(submission): Json<ContactSubmission>,
) -> Result<Json<Notification>, AppError> {
    submission.validate()?;

    info!(name = %submission.name.trim(), "Contact form submitted");
    Ok(Json(Notification {
        kind: NotificationKind::Success,
        message: CONTACT_THANKS_MESSAGE.to_string(),
    }))
}
