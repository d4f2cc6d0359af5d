//! The normalized event vocabulary exchanged between the transport layer
//! and the engine.
//!
//! The transport adapter decodes wire frames from either channel into these
//! types; the engine consumes them without knowing which channel they came
//! from. No ordering is guaranteed between the two channels, so every event
//! is applied idempotently.

use calview_types::{
    ActionStatusReport, DetectorId, LogEntry, LogStream, ProcessTag, ProgressSnapshot,
    SessionState,
};

/// A server-initiated event delivered over the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A single log record for one of the two buffers.
    Log {
        stream: LogStream,
        entry: LogEntry,
    },
    /// A complete progress snapshot (full table, not a delta).
    Progress(ProgressSnapshot),
    /// A session state report.
    State(SessionState),
    /// A status transition of one action.
    ActionStatus(ActionStatusReport),
    /// The controller restarted the session; all client state is stale.
    SessionReset,
}

/// A pull resource the client can request on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PullTarget {
    /// Bulk history dump for one log stream, used on (re)connect.
    LogDump(LogStream),
    /// Heavy per-entry payload for one (process, detector) pair.
    DetectorPayload {
        tag: ProcessTag,
        detector: DetectorId,
    },
    /// The pending operator prompt text (valid while the session waits on
    /// user input).
    PromptText,
    /// The current session state.
    SessionStatus,
}

/// The response to one [`PullTarget`] request.
#[derive(Debug, Clone, PartialEq)]
pub enum PullResponse {
    /// Ordered log history, oldest first.
    LogDump(Vec<LogEntry>),
    /// Opaque heavy payload. When `update_pending` is true the payload is
    /// still being produced upstream and the same fetch must be re-issued
    /// after a fixed delay.
    DetectorPayload {
        payload: serde_json::Value,
        update_pending: bool,
    },
    /// The pending operator prompt text.
    PromptText(String),
    /// The current session state.
    SessionStatus(SessionState),
}
