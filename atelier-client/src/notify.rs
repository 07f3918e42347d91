//! User notifications
//!
//! The save pipeline reports outcomes as notices; what renders them
//! (toast, status bar, log line) is the host application's business.

use parking_lot::Mutex;

/// A user-facing message with an outcome flavor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error {
        message: String,
        /// Underlying cause, when one is worth showing
        detail: Option<String>,
    },
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error {
            message: message.into(),
            detail: None,
        }
    }

    pub fn error_with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Notice::Error {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) => m,
            Notice::Error { message, .. } => message,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Notice::Success(_) => None,
            Notice::Error { detail, .. } => detail.as_deref(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error { .. })
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, message: &str) {
        self.notify(Notice::success(message));
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => self.notify(Notice::error_with_detail(message, detail)),
            None => self.notify(Notice::error(message)),
        }
    }
}

/// Routes notices to the log
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Success(message) => tracing::info!(message, "Notification"),
            Notice::Error {
                message,
                detail: Some(detail),
            } => tracing::warn!(message, detail, "Notification"),
            Notice::Error { message, .. } => tracing::warn!(message, "Notification"),
        }
    }
}

/// Collects notices for assertions in tests
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
