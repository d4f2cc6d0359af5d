//! Session lifecycle states and outbound action submissions.

use serde::{Deserialize, Serialize};

/// The controller-reported session state.
///
/// Before the first state report arrives the client has no state at all;
/// that window is modeled as `Option<SessionState>::None` by consumers,
/// never as an extra variant, so every reported state is one of these four.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No command active; action submission is available.
    Idle,
    /// A console command is being dispatched.
    RunningCmd,
    /// A calibration command is executing on the hardware.
    ExecCmd,
    /// The controller is blocked waiting on operator input.
    WaitUser,
}

impl SessionState {
    /// Whether action-submission affordances should accept input in this
    /// state. Only an idle session accepts new submissions.
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

/// An outbound action submission `{name, args}` sent over the push channel.
///
/// The engine does not wait for a synchronous response; it relies on
/// subsequent action-status events to update the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRequest {
    /// Action name as understood by the controller.
    pub name: String,
    /// Arbitrary action arguments, forwarded verbatim.
    #[serde(default)]
    pub args: serde_json::Value,
}

impl ActionRequest {
    /// Create a request with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: serde_json::Value::Null,
        }
    }

    /// Create a request with a JSON argument record.
    pub fn with_args(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}
