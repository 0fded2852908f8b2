use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Outbound hook rendering transient messages to the user. Fire-and-forget.
pub trait NotificationSink: Send + Sync {
    fn notify_success(&self, text: &str);
    fn notify_error(&self, text: &str);
}

impl<N: NotificationSink + ?Sized> NotificationSink for Arc<N> {
    fn notify_success(&self, text: &str) {
        (**self).notify_success(text);
    }

    fn notify_error(&self, text: &str) {
        (**self).notify_error(text);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub issued_at: DateTime<Utc>,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, text)
    }

    fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            issued_at: Utc::now(),
        }
    }
}

/// Sink that only writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify_success(&self, text: &str) {
        info!(notice = text, "user notice");
    }

    fn notify_error(&self, text: &str) {
        warn!(notice = text, "user error notice");
    }
}
