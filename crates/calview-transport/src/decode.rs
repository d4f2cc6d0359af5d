//! Wire JSON -> normalized engine events.
//!
//! Frames arrive as JSON objects with a `type` discriminator. A frame that
//! cannot be decoded at all is an error the caller drops; within a frame,
//! malformed entries (a bad log record in a dump, a bad status cell in a
//! snapshot) are skipped individually with a warning so one bad entry never
//! aborts the rest of its batch.

use serde_json::Value;
use tracing::warn;

use calview_engine::PushEvent;
use calview_types::{ActionStatusReport, LogEntry, LogStream, ProgressSnapshot, SessionState, StatusCode};

use crate::channel::ChannelError;

/// Decode one push frame.
pub fn decode_push_frame(value: &Value) -> Result<PushEvent, ChannelError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ChannelError::Malformed("frame has no type".into()))?;

    match kind {
        "log" => {
            let stream: LogStream = field(value, "stream")?;
            let entry: LogEntry = field(value, "entry")?;
            Ok(PushEvent::Log { stream, entry })
        }
        "progress" => {
            let table = value
                .get("snapshot")
                .ok_or_else(|| ChannelError::Malformed("progress frame has no snapshot".into()))?;
            Ok(PushEvent::Progress(decode_snapshot(table)))
        }
        "state" => {
            let state: SessionState = field(value, "state")?;
            Ok(PushEvent::State(state))
        }
        "action_status" => {
            // The report's fields sit at the frame's top level; the `type`
            // discriminator is simply ignored by the deserializer.
            let report: ActionStatusReport = serde_json::from_value(value.clone())
                .map_err(|e| ChannelError::Malformed(format!("bad action_status frame: {e}")))?;
            Ok(PushEvent::ActionStatus(report))
        }
        "session_reset" => Ok(PushEvent::SessionReset),
        other => Err(ChannelError::Malformed(format!("unknown frame type: {other}"))),
    }
}

/// Decode a progress table, skipping malformed cells.
///
/// The wire shape is `{tag: {detectorId: status}}`. A non-object process
/// row or an unknown status string drops that row/cell only.
pub fn decode_snapshot(value: &Value) -> ProgressSnapshot {
    let mut snapshot = ProgressSnapshot::empty();
    let Some(processes) = value.as_object() else {
        warn!("progress snapshot is not an object; treating as empty");
        return snapshot;
    };

    for (tag, detectors) in processes {
        let Some(detectors) = detectors.as_object() else {
            warn!(%tag, "skipping non-object process row in snapshot");
            continue;
        };
        for (detector, status) in detectors {
            match serde_json::from_value::<StatusCode>(status.clone()) {
                Ok(status) => snapshot.insert(tag.clone(), detector.clone(), status),
                Err(_) => {
                    warn!(%tag, %detector, %status, "skipping unrecognized status in snapshot");
                }
            }
        }
    }
    snapshot
}

/// Decode a bulk log dump, skipping malformed records.
pub fn decode_log_dump(entries: &[Value]) -> Vec<LogEntry> {
    entries
        .iter()
        .filter_map(|raw| match serde_json::from_value::<LogEntry>(raw.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping malformed log record in dump");
                None
            }
        })
        .collect()
}

fn field<T: serde::de::DeserializeOwned>(value: &Value, name: &str) -> Result<T, ChannelError> {
    let raw = value
        .get(name)
        .ok_or_else(|| ChannelError::Malformed(format!("frame has no {name}")))?;
    serde_json::from_value(raw.clone())
        .map_err(|e| ChannelError::Malformed(format!("bad {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_log_frame() {
        let frame = json!({
            "type": "log",
            "stream": "monitor",
            "entry": {"timestamp": 10.5, "level": 20, "logger": "ctl", "message": "hello"}
        });
        match decode_push_frame(&frame).unwrap() {
            PushEvent::Log { stream, entry } => {
                assert_eq!(stream, LogStream::Monitor);
                assert_eq!(entry.message, "hello");
                assert_eq!(entry.timestamp, 10.5);
            }
            other => panic!("expected Log, got {other:?}"),
        }
    }

    #[test]
    fn decodes_progress_frame() {
        let frame = json!({
            "type": "progress",
            "snapshot": {"zscan": {"1": "running", "2": "pending"}}
        });
        match decode_push_frame(&frame).unwrap() {
            PushEvent::Progress(snap) => {
                assert_eq!(snap.get("zscan", "1"), Some(StatusCode::Running));
                assert_eq!(snap.get("zscan", "2"), Some(StatusCode::Pending));
            }
            other => panic!("expected Progress, got {other:?}"),
        }
    }

    #[test]
    fn decodes_state_and_reset_frames() {
        let state = decode_push_frame(&json!({"type": "state", "state": "wait_user"})).unwrap();
        assert_eq!(state, PushEvent::State(SessionState::WaitUser));

        let reset = decode_push_frame(&json!({"type": "session_reset"})).unwrap();
        assert_eq!(reset, PushEvent::SessionReset);
    }

    #[test]
    fn decodes_action_status_frame() {
        let frame = json!({
            "type": "action_status",
            "name": "zscan",
            "status": "running",
            "timestamp": 3.5,
            "progress": {"numerator": 3, "denominator": 10}
        });
        match decode_push_frame(&frame).unwrap() {
            PushEvent::ActionStatus(report) => {
                assert_eq!(report.name, "zscan");
                assert_eq!(report.status, StatusCode::Running);
                assert_eq!(report.progress.unwrap().numerator, 3);
            }
            other => panic!("expected ActionStatus, got {other:?}"),
        }
    }

    #[test]
    fn frame_without_type_is_malformed() {
        let err = decode_push_frame(&json!({"state": "idle"})).unwrap_err();
        assert!(matches!(err, ChannelError::Malformed(_)));
    }

    #[test]
    fn unknown_frame_type_is_malformed() {
        let err = decode_push_frame(&json!({"type": "telemetry"})).unwrap_err();
        assert!(matches!(err, ChannelError::Malformed(_)));
    }

    #[test]
    fn snapshot_skips_bad_cells_but_keeps_good_ones() {
        let snap = decode_snapshot(&json!({
            "zscan": {"1": "running", "2": "launching"},
            "pedestal": "not-a-map",
            "adc": {"1": "complete"}
        }));
        assert_eq!(snap.get("zscan", "1"), Some(StatusCode::Running));
        assert_eq!(snap.get("zscan", "2"), None);
        assert_eq!(snap.get("pedestal", "1"), None);
        assert_eq!(snap.get("adc", "1"), Some(StatusCode::Complete));
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn log_dump_skips_malformed_records() {
        let entries = vec![
            json!({"timestamp": 1.0, "level": 20, "logger": "ctl", "message": "first"}),
            json!({"level": 20, "message": "no timestamp"}),
            json!({"timestamp": 2.0, "level": 30, "logger": "ctl", "message": "second"}),
        ];
        let decoded = decode_log_dump(&entries);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].message, "first");
        assert_eq!(decoded[1].message, "second");
    }
}
