//! Transient notifications shown to the visitor.
//!
//! At most one notification is visible: `show` replaces whatever is current,
//! and a notification expires `NOTIFICATION_TTL` after it was shown.
//!
//! There is one center per process, so every visitor polling
//! `/api/notification` sees the same banner. It carries resume generation
//! status only; request-specific outcomes such as the contact form are
//! returned in the response of the request that caused them.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

pub struct NotificationCenter {
    slot: Mutex<Option<(Notification, Instant)>>,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    pub fn show(&self, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification {
            kind,
            message: message.into(),
        };
        debug!(kind = ?notification.kind, message = %notification.message, "Notification");
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some((notification, Instant::now()));
    }

    /// The visible notification, if it has not expired.
    pub fn current(&self) -> Option<Notification> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some((_, shown_at)) if shown_at.elapsed() >= self.ttl => {
                *slot = None;
                None
            }
            Some((notification, _)) => Some(notification.clone()),
            None => None,
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notification_expires_after_ttl() {
        let center = NotificationCenter::new();
        center.show(NotificationKind::Success, "Saved");
        tokio::time::advance(Duration::from_millis(2_900)).await;
        assert_eq!(center.current().unwrap().message, "Saved");
        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(center.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notification_replaces_current() {
        let center = NotificationCenter::new();
        center.show(NotificationKind::Info, "Generating");
        tokio::time::advance(Duration::from_secs(2)).await;
        center.show(NotificationKind::Error, "Failed");
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(
            center.current(),
            Some(Notification {
                kind: NotificationKind::Error,
                message: "Failed".to_string(),
            })
        );
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_value(Notification {
            kind: NotificationKind::Success,
            message: "ok".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "success");
    }
}
