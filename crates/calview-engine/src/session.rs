//! Controller-driven session state and input gating.
//!
//! Transitions come exclusively from inbound state reports; the one
//! client-initiated change is the optimistic disable right after an action
//! submission, which closes the window where a stale "enabled" view could
//! let a second submission through before the controller acknowledges the
//! first.

use calview_types::SessionState;

use crate::sink::ViewSink;

/// Tracks the reported session state and derives input enablement.
///
/// The state is `None` until the first report arrives; during that window
/// everything is disabled (fail-safe).
#[derive(Debug, Default)]
pub struct SessionStateMachine {
    state: Option<SessionState>,
    /// Set by `note_submission`, cleared by the next controller report.
    submission_pending: bool,
    /// Bumped on every entry to or exit from WaitUser; an in-flight prompt
    /// pull carries the epoch it was issued for and is discarded if the
    /// epoch has moved on by the time it resolves.
    prompt_epoch: u64,
}

impl SessionStateMachine {
    /// Create a machine in the unknown (pre-first-sync) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last reported state, or `None` before the first report.
    pub fn state(&self) -> Option<SessionState> {
        self.state
    }

    /// Whether action-submission affordances should currently accept input.
    pub fn inputs_enabled(&self) -> bool {
        !self.submission_pending && self.state.is_some_and(|s| s.accepts_input())
    }

    /// The current prompt epoch.
    pub fn prompt_epoch(&self) -> u64 {
        self.prompt_epoch
    }

    /// Apply a controller state report.
    ///
    /// Entering WaitUser requests exactly one prompt-text pull for this
    /// transition (not one per redundant re-report); leaving it hides the
    /// prompt affordance and invalidates any pull still in flight.
    pub fn apply_report(&mut self, next: SessionState, sink: &dyn ViewSink) {
        let prev = self.state;
        self.state = Some(next);
        // The controller's report supersedes the optimistic disable.
        self.submission_pending = false;

        sink.session_state_changed(next);
        sink.inputs_enabled(self.inputs_enabled());

        let was_waiting = prev == Some(SessionState::WaitUser);
        let is_waiting = next == SessionState::WaitUser;
        if is_waiting && !was_waiting {
            self.prompt_epoch += 1;
            sink.prompt_requested(self.prompt_epoch);
        } else if was_waiting && !is_waiting {
            self.prompt_epoch += 1;
            sink.prompt_hidden();
        }
    }

    /// Deliver a resolved prompt pull. Returns whether it was applied.
    ///
    /// The prompt is shown only if `epoch` is still current and the session
    /// is still waiting on the user; a stale resolution is dropped without
    /// any effect.
    pub fn apply_prompt(&self, epoch: u64, text: &str, sink: &dyn ViewSink) -> bool {
        if epoch != self.prompt_epoch || self.state != Some(SessionState::WaitUser) {
            return false;
        }
        sink.prompt_shown(text);
        true
    }

    /// Optimistically disable inputs right after submitting an action.
    pub fn note_submission(&mut self, sink: &dyn ViewSink) {
        self.submission_pending = true;
        sink.inputs_enabled(false);
    }

    /// Forget everything (disconnect / session reset): state unknown,
    /// inputs disabled, in-flight prompt pulls invalidated.
    pub fn reset(&mut self, sink: &dyn ViewSink) {
        let was_waiting = self.state == Some(SessionState::WaitUser);
        self.state = None;
        self.submission_pending = false;
        self.prompt_epoch += 1;
        sink.inputs_enabled(false);
        if was_waiting {
            sink.prompt_hidden();
        }
    }
}
