//! Operator-facing progress reporting.

use serde::{Deserialize, Serialize};
use std::io::Write;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warn,
    Success,
    Waiting,
    Fatal,
}

/// One message to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Sink for operator notices.
///
/// `fatal` only reports. Ending the process is left to the binary so the
/// library stays usable from tests and other callers.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn info(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Info, message));
    }

    fn warn(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Warn, message));
    }

    fn success(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Success, message));
    }

    fn waiting(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Waiting, message));
    }

    fn fatal(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Fatal, message));
    }
}

/// Writes notices to stderr with a level tag.
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier {
    json: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self { json: false }
    }

    /// One JSON object per line instead of tagged text.
    pub fn json() -> Self {
        Self { json: true }
    }

    fn tag(level: NoticeLevel) -> &'static str {
        match level {
            NoticeLevel::Info => "[INFO]",
            NoticeLevel::Warn => "[WARN]",
            NoticeLevel::Success => "[SUCCESS]",
            NoticeLevel::Waiting => "[WAITING]",
            NoticeLevel::Fatal => "[FATAL]",
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let mut stderr = std::io::stderr().lock();
        let line = if self.json {
            serde_json::to_string(&notice).unwrap_or_else(|_| notice.message.clone())
        } else {
            format!("{} {}", Self::tag(notice.level), notice.message)
        };
        let _ = writeln!(stderr, "{}", line);
    }
}

/// Channel-based notifier; forwards every notice to a receiver.
pub struct ChannelNotifier {
    sender: mpsc::Sender<Notice>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::Sender<Notice>) -> Self {
        Self { sender }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if let Err(e) = self.sender.try_send(notice) {
            tracing::warn!("[ChannelNotifier] Dropped notice: {}", e);
        }
    }
}
