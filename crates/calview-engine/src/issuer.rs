//! Bounded-retry pull request primitive.
//!
//! Every pull in the system goes through [`RequestIssuer::issue`]: one
//! request, an optional fixed-interval retry policy, and a terminal
//! diagnostic when the attempts are exhausted. Failures never propagate to
//! the caller -- an exhausted request simply resolves to `None`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use calview_types::{CalviewError, LogEntry, RetryPolicy};

use crate::event::{PullResponse, PullTarget};
use crate::sink::ViewSink;

/// Severity used for terminal diagnostics, in the controller's numeric
/// level scheme.
const DIAGNOSTIC_LEVEL_ERROR: i32 = 40;

/// The pull side of the transport, as the engine sees it.
///
/// Implemented by the HTTP client in the transport crate and by the mock
/// in the test harness.
#[async_trait]
pub trait PullSource: Send + Sync {
    /// Fetch one resource. A transport or API failure is an `Err`; the
    /// issuer decides whether to retry it.
    async fn fetch(&self, target: &PullTarget) -> Result<PullResponse, CalviewError>;
}

/// Issues pull requests with bounded retries.
#[derive(Clone)]
pub struct RequestIssuer {
    source: Arc<dyn PullSource>,
}

impl RequestIssuer {
    /// Create an issuer over the given pull source.
    pub fn new(source: Arc<dyn PullSource>) -> Self {
        Self { source }
    }

    /// Issue one request.
    ///
    /// On success resolves `Some(response)` exactly once. On failure: with
    /// no policy (or attempts exhausted) emits exactly one terminal
    /// diagnostic -- to the tracing log and to the sink's error surface,
    /// never to the log buffers -- and resolves `None`; otherwise sleeps
    /// the policy interval and retries. Each call owns its own attempt
    /// counter, so concurrent calls never share retry state.
    pub async fn issue(
        &self,
        target: PullTarget,
        policy: Option<RetryPolicy>,
        sink: &dyn ViewSink,
    ) -> Option<PullResponse> {
        let (mut remaining, interval) = match policy {
            Some(p) => (p.max_attempts, p.interval()),
            None => (0, std::time::Duration::ZERO),
        };
        loop {
            match self.source.fetch(&target).await {
                Ok(response) => return Some(response),
                Err(err) if remaining == 0 => {
                    warn!(?target, error = %err, "pull request failed, giving up");
                    sink.diagnostic(&LogEntry::new(
                        Utc::now().timestamp_millis() as f64 / 1_000.0,
                        DIAGNOSTIC_LEVEL_ERROR,
                        "calview.issuer",
                        format!("request {target:?} failed: {err}"),
                    ));
                    return None;
                }
                Err(err) => {
                    remaining -= 1;
                    debug!(?target, error = %err, remaining, "pull request failed, retrying");
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }
}
