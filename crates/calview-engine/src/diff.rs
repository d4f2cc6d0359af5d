//! Pure delta computation between two progress snapshots.

use std::collections::BTreeSet;

use calview_types::{DetectorId, ProcessTag, ProgressSnapshot, StatusCode};

/// A (process tag, detector id) pair whose displayed/fetched data must be
/// refreshed.
pub type DirtyKey = (ProcessTag, DetectorId);

/// Compute the dirty set between the previously applied snapshot and the
/// next one.
///
/// A pair from `next` is dirty when `previous` has no entry for it, when
/// the stored status differs, or when the next status is
/// [`StatusCode::Running`] -- running entries are always dirty so progress
/// bars keep refreshing even without a status change.
///
/// Pairs present only in `previous` are NOT reported: disappearance is not
/// itself a dirty signal (process sets only grow within a session).
/// Callers that need removal detection must diff the key sets separately.
///
/// Deterministic and side-effect-free; the result iterates in key order.
pub fn snapshot_diff(previous: &ProgressSnapshot, next: &ProgressSnapshot) -> BTreeSet<DirtyKey> {
    let mut dirty = BTreeSet::new();
    for (tag, detector, status) in next.iter() {
        let changed = match previous.get(tag, detector) {
            None => true,
            Some(prev) => prev != status,
        };
        if changed || status == StatusCode::Running {
            dirty.insert((tag.to_string(), detector.to_string()));
        }
    }
    dirty
}
