//! Calibration status model: per-process, per-detector status tables.
//!
//! A [`ProgressSnapshot`] is a complete point-in-time status table for all
//! known (process, detector) pairs reported by the controller -- not a
//! delta. Snapshots are immutable once received; the engine computes deltas
//! between consecutive snapshots itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A calibration process identifier (e.g. `"zscan"`, `"pedestal"`).
pub type ProcessTag = String;

/// A detector identifier within a process. Controllers report these as
/// string keys even when they are numeric board indices.
pub type DetectorId = String;

/// The status of one (process, detector) calibration step.
///
/// The variant order is display priority only -- there is no meaningful
/// ordering between statuses beyond which one wins a summary cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Queued, not yet started.
    Pending,
    /// Currently executing on the controller.
    Running,
    /// Finished successfully.
    Complete,
    /// Finished with an error.
    Error,
}

impl StatusCode {
    /// Whether this status is terminal (the step will not change again
    /// without a new run).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusCode::Complete | StatusCode::Error)
    }
}

/// A complete point-in-time status table, keyed by process tag and then
/// detector id.
///
/// Uses `BTreeMap` so iteration order (and therefore diff and display
/// order) is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProgressSnapshot {
    pub processes: BTreeMap<ProcessTag, BTreeMap<DetectorId, StatusCode>>,
}

impl ProgressSnapshot {
    /// An empty snapshot (no processes known yet).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up the status of one (process, detector) pair.
    pub fn get(&self, tag: &str, detector: &str) -> Option<StatusCode> {
        self.processes.get(tag).and_then(|d| d.get(detector)).copied()
    }

    /// Insert a status, creating the process row if needed.
    pub fn insert(
        &mut self,
        tag: impl Into<ProcessTag>,
        detector: impl Into<DetectorId>,
        status: StatusCode,
    ) {
        self.processes
            .entry(tag.into())
            .or_default()
            .insert(detector.into(), status);
    }

    /// Iterate all (tag, detector, status) triples in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, StatusCode)> {
        self.processes.iter().flat_map(|(tag, detectors)| {
            detectors
                .iter()
                .map(move |(det, status)| (tag.as_str(), det.as_str(), *status))
        })
    }

    /// Total number of (tag, detector) entries.
    pub fn len(&self) -> usize {
        self.processes.values().map(|d| d.len()).sum()
    }

    /// Whether the snapshot contains no entries at all.
    pub fn is_empty(&self) -> bool {
        self.processes.values().all(|d| d.is_empty())
    }
}

/// Per-detector rollup across all processes, derived on demand from the
/// last applied snapshot. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorAggregate {
    /// Number of processes that include this detector.
    pub total: usize,
    /// Number of those marked [`StatusCode::Complete`].
    pub completed: usize,
    /// Whether any of them is currently [`StatusCode::Running`].
    pub running_now: bool,
}
