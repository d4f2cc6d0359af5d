//! Log records forwarded from the controller.
//!
//! The controller is the sole timestamp authority: entries carry the
//! controller's epoch-seconds timestamp and are never re-stamped or
//! reordered on the client side.

use serde::{Deserialize, Serialize};

/// Which bounded buffer a log record belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LogStream {
    /// The monitor/session log: controller-side progress and diagnostics.
    Monitor,
    /// The command log: output of the interactive command console.
    Command,
}

/// One log record as reported by the controller.
///
/// Immutable once created; destroyed only by buffer eviction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    /// Controller-side timestamp, epoch seconds.
    pub timestamp: f64,
    /// Numeric severity in the controller's level scheme.
    pub level: i32,
    /// Name of the originating logger.
    pub logger: String,
    /// Pre-formatted message text.
    pub message: String,
    /// Positional arguments that accompanied the message, if any.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl LogEntry {
    /// Create an entry with no positional arguments.
    pub fn new(timestamp: f64, level: i32, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            logger: logger.into(),
            message: message.into(),
            args: Vec::new(),
        }
    }
}
