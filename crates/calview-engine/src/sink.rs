//! The seam between the engine and rendering code.
//!
//! Every display-relevant effect the engine produces goes through a
//! [`ViewSink`]. All methods default to no-ops so an embedding only
//! implements the hooks it renders; the engine never knows (or cares) what
//! a hook does. Sinks take `&self` -- implementations that record state use
//! interior mutability.

use calview_types::{DetectorAggregate, LogEntry, LogStream, SessionState, StatusCode};

/// Receiver for engine effects. The engine guarantees it only ever calls
/// these from the single logical event loop, in a deterministic order.
pub trait ViewSink {
    /// A log entry was appended to the given buffer.
    fn log_appended(&self, stream: LogStream) {
        let _ = stream;
    }

    /// The status of one (process, detector) entry changed (or the entry is
    /// running and needs a progress refresh).
    fn status_changed(&self, tag: &str, detector: &str, status: StatusCode) {
        let _ = (tag, detector, status);
    }

    /// A detector's aggregate rollup was recomputed.
    fn aggregate_changed(&self, detector: &str, aggregate: DetectorAggregate) {
        let _ = (detector, aggregate);
    }

    /// The heavy payload for one (process, detector) entry is stale and must
    /// be re-fetched. The embedding (or runner) services this via the pull
    /// channel; the engine never fetches payloads itself.
    fn refetch_requested(&self, tag: &str, detector: &str) {
        let _ = (tag, detector);
    }

    /// A previously requested heavy payload arrived.
    fn payload_ready(&self, tag: &str, detector: &str, payload: &serde_json::Value) {
        let _ = (tag, detector, payload);
    }

    /// Action-submission affordances should be enabled or disabled.
    fn inputs_enabled(&self, enabled: bool) {
        let _ = enabled;
    }

    /// The session entered the wait-for-user state; the pending prompt text
    /// must be pulled once. `epoch` identifies this entry -- a pull that
    /// resolves after the epoch moved on is discarded via
    /// [`SessionStateMachine::apply_prompt`](crate::SessionStateMachine::apply_prompt).
    fn prompt_requested(&self, epoch: u64) {
        let _ = epoch;
    }

    /// The operator prompt text is available for display.
    fn prompt_shown(&self, text: &str) {
        let _ = text;
    }

    /// The user-input affordance should be hidden again.
    fn prompt_hidden(&self) {}

    /// The session state changed.
    fn session_state_changed(&self, state: SessionState) {
        let _ = state;
    }

    /// An action's status timeline gained an entry.
    fn action_updated(&self, name: &str) {
        let _ = name;
    }

    /// The controller cannot be reached; show a static "cannot determine
    /// status" indication instead of live data.
    fn status_unavailable(&self) {}

    /// A terminal diagnostic from the request issuer. Goes to an error
    /// surface, never to the log buffers.
    fn diagnostic(&self, entry: &LogEntry) {
        let _ = entry;
    }
}

/// A sink that ignores every effect. Useful for tests and teardown paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ViewSink for NullSink {}
