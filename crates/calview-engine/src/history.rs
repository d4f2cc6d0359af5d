//! Append-only per-action status timelines.
//!
//! Every action the controller reports on gets one [`ActionEntry`] keyed by
//! its name. Entries are created on the first-ever report in the current
//! session and only gain log rows after that; nothing is mutated or
//! reordered. The full ordered history stays available for audit until the
//! session resets.

use std::collections::HashMap;

use calview_types::{ActionEntry, ActionStatus, ActionStatusReport};

use crate::sink::ViewSink;

/// Tracks every action observed in the current session.
#[derive(Debug, Default)]
pub struct ActionHistory {
    /// Entries in first-observation order.
    entries: Vec<ActionEntry>,
    /// Name -> index into `entries`.
    index: HashMap<String, usize>,
    /// Index of the entry that most recently gained a status row.
    last_updated: Option<usize>,
}

impl ActionHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a status report, creating the action's entry if this is the
    /// first report for its name.
    pub fn apply(&mut self, report: ActionStatusReport, sink: &dyn ViewSink) {
        let idx = match self.index.get(&report.name) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(ActionEntry {
                    name: report.name.clone(),
                    args: report.args.clone().unwrap_or(serde_json::Value::Null),
                    log: Vec::new(),
                });
                self.index.insert(report.name.clone(), idx);
                idx
            }
        };

        self.entries[idx].log.push(ActionStatus {
            status: report.status,
            timestamp: report.timestamp,
            progress: report.progress,
        });
        self.last_updated = Some(idx);
        sink.action_updated(&report.name);
    }

    /// The most recently updated action, if any has been observed.
    pub fn latest(&self) -> Option<&ActionEntry> {
        self.last_updated.map(|idx| &self.entries[idx])
    }

    /// Look up one action by name.
    pub fn get(&self, name: &str) -> Option<&ActionEntry> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    /// Controller-supplied progress for an entry, taken from its most
    /// recent status row. Never derived from the log length.
    pub fn progress_fraction(&self, entry: &ActionEntry) -> Option<(u64, u64)> {
        entry
            .latest_status()
            .and_then(|s| s.progress)
            .map(|p| (p.numerator, p.denominator))
    }

    /// The tail of an entry's status log for display, at most `max` rows.
    pub fn display_log<'a>(&self, entry: &'a ActionEntry, max: usize) -> &'a [ActionStatus] {
        let len = entry.log.len();
        &entry.log[len.saturating_sub(max)..]
    }

    /// The full ordered history, first-observed first.
    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    /// Forget everything (session reset only).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.last_updated = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calview_types::{ProgressFraction, StatusCode};

    use crate::sink::NullSink;

    fn report(name: &str, status: StatusCode, timestamp: f64) -> ActionStatusReport {
        ActionStatusReport {
            name: name.into(),
            args: None,
            status,
            timestamp,
            progress: None,
        }
    }

    #[test]
    fn first_report_creates_entry_with_args() {
        let mut history = ActionHistory::new();
        history.apply(
            ActionStatusReport {
                name: "zscan".into(),
                args: Some(serde_json::json!({"boards": [1]})),
                status: StatusCode::Pending,
                timestamp: 1.0,
                progress: None,
            },
            &NullSink,
        );

        let entry = history.get("zscan").unwrap();
        assert_eq!(entry.args, serde_json::json!({"boards": [1]}));
        assert_eq!(entry.log.len(), 1);
    }

    #[test]
    fn later_reports_append_without_touching_args() {
        let mut history = ActionHistory::new();
        history.apply(
            ActionStatusReport {
                name: "zscan".into(),
                args: Some(serde_json::json!({"boards": [1]})),
                status: StatusCode::Pending,
                timestamp: 1.0,
                progress: None,
            },
            &NullSink,
        );
        history.apply(report("zscan", StatusCode::Running, 2.0), &NullSink);
        history.apply(report("zscan", StatusCode::Complete, 3.0), &NullSink);

        let entry = history.get("zscan").unwrap();
        assert_eq!(entry.args, serde_json::json!({"boards": [1]}));
        let statuses: Vec<_> = entry.log.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![StatusCode::Pending, StatusCode::Running, StatusCode::Complete]
        );
        let timestamps: Vec<_> = entry.log.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn latest_tracks_most_recent_update_across_actions() {
        let mut history = ActionHistory::new();
        history.apply(report("zscan", StatusCode::Complete, 1.0), &NullSink);
        history.apply(report("pedestal", StatusCode::Pending, 2.0), &NullSink);
        assert_eq!(history.latest().unwrap().name, "pedestal");

        // An update to an older action makes it latest again.
        history.apply(report("zscan", StatusCode::Pending, 3.0), &NullSink);
        assert_eq!(history.latest().unwrap().name, "zscan");
    }

    #[test]
    fn progress_comes_from_the_most_recent_row_only() {
        let mut history = ActionHistory::new();
        history.apply(
            ActionStatusReport {
                name: "zscan".into(),
                args: None,
                status: StatusCode::Running,
                timestamp: 1.0,
                progress: Some(ProgressFraction {
                    numerator: 3,
                    denominator: 10,
                }),
            },
            &NullSink,
        );

        let entry = history.get("zscan").unwrap();
        assert_eq!(history.progress_fraction(entry), Some((3, 10)));

        // A later row without progress clears the fraction even though the
        // log is now longer.
        history.apply(report("zscan", StatusCode::Complete, 2.0), &NullSink);
        let entry = history.get("zscan").unwrap();
        assert_eq!(history.progress_fraction(entry), None);
    }

    #[test]
    fn display_log_truncates_to_the_tail() {
        let mut history = ActionHistory::new();
        for n in 0..6 {
            history.apply(report("zscan", StatusCode::Running, n as f64), &NullSink);
        }
        let entry = history.get("zscan").unwrap();

        let shown = history.display_log(entry, 4);
        assert_eq!(shown.len(), 4);
        assert_eq!(shown[0].timestamp, 2.0);
        assert_eq!(shown[3].timestamp, 5.0);

        // Asking for more than exists yields the whole log.
        assert_eq!(history.display_log(entry, 100).len(), 6);
    }

    #[test]
    fn entries_keep_first_observation_order() {
        let mut history = ActionHistory::new();
        history.apply(report("zscan", StatusCode::Pending, 1.0), &NullSink);
        history.apply(report("pedestal", StatusCode::Pending, 2.0), &NullSink);
        history.apply(report("zscan", StatusCode::Running, 3.0), &NullSink);

        let names: Vec<_> = history.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["zscan", "pedestal"]);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut history = ActionHistory::new();
        history.apply(report("zscan", StatusCode::Pending, 1.0), &NullSink);
        history.clear();
        assert!(history.entries().is_empty());
        assert!(history.latest().is_none());
        assert!(history.get("zscan").is_none());
    }
}
