//! Per-action status timelines.
//!
//! Every action the controller reports on (whether submitted from this
//! client or elsewhere) gets an [`ActionEntry`] whose `log` records each
//! observed status transition in arrival order.

use serde::{Deserialize, Serialize};

use crate::status::StatusCode;

/// Controller-supplied progress for an action, `numerator / denominator`
/// (e.g. sweep 3 of 10). Carried alongside a status report; never derived
/// from the length of the status log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressFraction {
    pub numerator: u64,
    pub denominator: u64,
}

/// One observed status transition of an action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ActionStatus {
    /// The reported status.
    pub status: StatusCode,
    /// Controller-side timestamp, epoch seconds.
    pub timestamp: f64,
    /// Progress carried with this report, if the controller sent any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressFraction>,
}

/// A normalized action-status event as decoded from either channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionStatusReport {
    /// Action name (the action's identity within a session).
    pub name: String,
    /// Action arguments, present on the first report for a new action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    /// The reported status.
    pub status: StatusCode,
    /// Controller-side timestamp, epoch seconds.
    pub timestamp: f64,
    /// Progress carried with this report, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressFraction>,
}

/// The full observed timeline of one action.
///
/// `log` is append-only and never reordered; prior entries are immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionEntry {
    /// Action name.
    pub name: String,
    /// Arguments recorded when the action was first observed.
    pub args: serde_json::Value,
    /// Status transitions in arrival order.
    pub log: Vec<ActionStatus>,
}

impl ActionEntry {
    /// The most recent status transition, if any has been observed.
    pub fn latest_status(&self) -> Option<&ActionStatus> {
        self.log.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_roundtrip_with_progress() {
        let report = ActionStatusReport {
            name: "zscan".into(),
            args: Some(serde_json::json!({"boards": [3]})),
            status: StatusCode::Running,
            timestamp: 100.5,
            progress: Some(ProgressFraction {
                numerator: 3,
                denominator: 10,
            }),
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: ActionStatusReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let report = ActionStatusReport {
            name: "pedestal".into(),
            args: None,
            status: StatusCode::Pending,
            timestamp: 1.0,
            progress: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("args").is_none());
        assert!(json.get("progress").is_none());
    }

    #[test]
    fn latest_status_is_last_appended() {
        let entry = ActionEntry {
            name: "zscan".into(),
            args: serde_json::Value::Null,
            log: vec![
                ActionStatus {
                    status: StatusCode::Pending,
                    timestamp: 1.0,
                    progress: None,
                },
                ActionStatus {
                    status: StatusCode::Running,
                    timestamp: 2.0,
                    progress: None,
                },
            ],
        };
        assert_eq!(entry.latest_status().unwrap().status, StatusCode::Running);
    }
}
