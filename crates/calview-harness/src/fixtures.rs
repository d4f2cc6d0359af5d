//! Sample data for tests.

use calview_engine::PushEvent;
use calview_types::{
    ActionStatusReport, LogEntry, LogStream, ProgressFraction, ProgressSnapshot, StatusCode,
};

/// A log entry numbered `n`, timestamped at `n` seconds.
pub fn entry(n: usize) -> LogEntry {
    LogEntry::new(n as f64, 20, "calib.session", format!("entry {n}"))
}

/// `count` consecutive log entries starting at 0.
pub fn entries(count: usize) -> Vec<LogEntry> {
    (0..count).map(entry).collect()
}

/// A snapshot from `(tag, detector, status)` triples.
pub fn snapshot(cells: &[(&str, &str, StatusCode)]) -> ProgressSnapshot {
    let mut snap = ProgressSnapshot::empty();
    for (tag, det, status) in cells {
        snap.insert(*tag, *det, *status);
    }
    snap
}

/// An action status report without args or progress.
pub fn report(name: &str, status: StatusCode, timestamp: f64) -> ActionStatusReport {
    ActionStatusReport {
        name: name.into(),
        args: None,
        status,
        timestamp,
        progress: None,
    }
}

/// An action status report carrying controller-supplied progress.
pub fn report_with_progress(
    name: &str,
    status: StatusCode,
    timestamp: f64,
    numerator: u64,
    denominator: u64,
) -> ActionStatusReport {
    ActionStatusReport {
        progress: Some(ProgressFraction {
            numerator,
            denominator,
        }),
        ..report(name, status, timestamp)
    }
}

/// A monitor log push event.
pub fn log_event(n: usize) -> PushEvent {
    PushEvent::Log {
        stream: LogStream::Monitor,
        entry: entry(n),
    }
}

/// A progress push event from `(tag, detector, status)` triples.
pub fn progress_event(cells: &[(&str, &str, StatusCode)]) -> PushEvent {
    PushEvent::Progress(snapshot(cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_ordered_by_timestamp() {
        let all = entries(3);
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn report_with_progress_carries_the_fraction() {
        let r = report_with_progress("zscan", StatusCode::Running, 1.0, 3, 10);
        let p = r.progress.unwrap();
        assert_eq!((p.numerator, p.denominator), (3, 10));
    }
}
