//! Single-flight snapshot reconciliation.
//!
//! Snapshots arrive faster than they can be applied when the controller is
//! busy, and a pull response can race a push event. The queue serializes
//! application: snapshots are applied strictly in arrival order, and at most
//! one draining pass is ever active. Re-entrant enqueues (from a sink
//! callback reacting to an effect) only append; they never start a second
//! drain.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use calview_types::{DetectorAggregate, ProgressSnapshot, StatusCode};

use crate::diff::{snapshot_diff, DirtyKey};
use crate::sink::ViewSink;

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<ProgressSnapshot>,
    draining: bool,
    applied: ProgressSnapshot,
}

/// FIFO queue of pending snapshots plus the last applied one.
///
/// Interior mutability lets `enqueue` take `&self`, so a sink callback can
/// re-enter it mid-drain; the engine runs on a single logical event loop,
/// so there is no cross-thread access.
#[derive(Debug, Default)]
pub struct ReconcileQueue {
    inner: RefCell<Inner>,
}

/// Clears the draining flag on every exit path, unwinding included, so a
/// failure while applying one snapshot cannot wedge the queue.
struct DrainGuard<'a> {
    inner: &'a RefCell<Inner>,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.inner.borrow_mut().draining = false;
    }
}

impl ReconcileQueue {
    /// Create an empty queue with no applied snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot and, if no drain is active, drain the queue.
    ///
    /// Draining pops snapshots oldest-first, diffs each against the last
    /// applied snapshot, applies it, and emits the downstream effects for
    /// the dirty set: aggregate recomputation, per-entry status updates,
    /// and refetch requests for the heavy payloads. If applying one
    /// snapshot panics in a sink, that snapshot's remaining effects are
    /// lost and draining continues with the next one.
    pub fn enqueue(&self, snapshot: ProgressSnapshot, sink: &dyn ViewSink) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(snapshot);
            if inner.draining {
                // A drain is already active further up the stack; it will
                // pick this snapshot up in order.
                return;
            }
            inner.draining = true;
        }

        let _guard = DrainGuard { inner: &self.inner };
        loop {
            let next = self.inner.borrow_mut().queue.pop_front();
            let Some(next) = next else { break };

            let dirty = {
                let inner = self.inner.borrow();
                snapshot_diff(&inner.applied, &next)
            };
            self.inner.borrow_mut().applied = next;

            // No borrow is held while effects run: sinks may re-enter
            // `enqueue` or query `aggregate`.
            let outcome = catch_unwind(AssertUnwindSafe(|| self.emit_effects(&dirty, sink)));
            if outcome.is_err() {
                error!(
                    dirty = dirty.len(),
                    "sink panicked while applying snapshot; effects lost"
                );
            }
        }
    }

    fn emit_effects(&self, dirty: &BTreeSet<DirtyKey>, sink: &dyn ViewSink) {
        let detectors: BTreeSet<&str> = dirty.iter().map(|(_, det)| det.as_str()).collect();
        for detector in detectors {
            sink.aggregate_changed(detector, self.aggregate(detector));
        }

        for (tag, detector) in dirty {
            let status = self.inner.borrow().applied.get(tag, detector);
            // Dirty keys come from the applied snapshot, so this always holds.
            if let Some(status) = status {
                sink.status_changed(tag, detector, status);
            }
        }

        for (tag, detector) in dirty {
            sink.refetch_requested(tag, detector);
        }
    }

    /// Derive the per-detector rollup from the last applied snapshot.
    pub fn aggregate(&self, detector: &str) -> DetectorAggregate {
        let inner = self.inner.borrow();
        let mut aggregate = DetectorAggregate::default();
        for detectors in inner.applied.processes.values() {
            if let Some(status) = detectors.get(detector) {
                aggregate.total += 1;
                match status {
                    StatusCode::Complete => aggregate.completed += 1,
                    StatusCode::Running => aggregate.running_now = true,
                    _ => {}
                }
            }
        }
        aggregate
    }

    /// A copy of the last applied snapshot.
    pub fn last_applied(&self) -> ProgressSnapshot {
        self.inner.borrow().applied.clone()
    }

    /// Whether a draining pass is currently active.
    pub fn is_draining(&self) -> bool {
        self.inner.borrow().draining
    }

    /// Number of snapshots waiting to be applied.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Drop all queued snapshots and forget the applied one (session reset).
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.queue.clear();
        inner.applied = ProgressSnapshot::empty();
    }
}
