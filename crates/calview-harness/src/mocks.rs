//! Mock implementations of the transport seams for testing without real
//! infrastructure.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use calview_engine::{PullResponse, PullSource, PullTarget, PushEvent, ViewSink};
use calview_transport::{ChannelError, PushChannel};
use calview_types::{
    ActionRequest, CalviewError, DetectorAggregate, LogEntry, LogStream, SessionState, StatusCode,
};

// ---------------------------------------------------------------------------
// MockPushChannel
// ---------------------------------------------------------------------------

/// Shared handle to the submissions recorded by a [`MockPushChannel`].
///
/// Clone it before handing the channel to the runner; the channel is
/// consumed, the log handle is not.
#[derive(Debug, Clone, Default)]
pub struct SubmissionLog {
    inner: Arc<Mutex<Vec<ActionRequest>>>,
}

impl SubmissionLog {
    /// All submissions so far, in order.
    pub fn all(&self) -> Vec<ActionRequest> {
        self.inner.lock().expect("submission log lock poisoned").clone()
    }

    /// Number of submissions so far.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("submission log lock poisoned").len()
    }

    /// Whether nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A push channel that replays a scripted event sequence.
///
/// Once the script is drained, `recv` either reports
/// [`ChannelError::Shutdown`] (the default, ending a runner loop) or pends
/// forever (for tests that drive cancellation).
pub struct MockPushChannel {
    events: VecDeque<PushEvent>,
    submissions: SubmissionLog,
    pend_when_drained: bool,
}

impl MockPushChannel {
    /// A channel that replays `events` and then shuts down.
    pub fn new(events: Vec<PushEvent>) -> Self {
        Self {
            events: events.into(),
            submissions: SubmissionLog::default(),
            pend_when_drained: false,
        }
    }

    /// Keep `recv` pending instead of shutting down once drained.
    pub fn pend_when_drained(mut self) -> Self {
        self.pend_when_drained = true;
        self
    }

    /// Handle to the recorded submissions.
    pub fn submission_log(&self) -> SubmissionLog {
        self.submissions.clone()
    }
}

#[async_trait]
impl PushChannel for MockPushChannel {
    async fn recv(&mut self) -> Result<Option<PushEvent>, ChannelError> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None if self.pend_when_drained => std::future::pending().await,
            None => Err(ChannelError::Shutdown),
        }
    }

    async fn submit(&mut self, request: &ActionRequest) -> Result<(), ChannelError> {
        self.submissions
            .inner
            .lock()
            .expect("submission log lock poisoned")
            .push(request.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock-push"
    }
}

// ---------------------------------------------------------------------------
// MockPullChannel
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MockPullInner {
    /// Queued one-shot outcomes per target, consumed front to back.
    scripted: BTreeMap<PullTarget, VecDeque<Result<PullResponse, String>>>,
    /// Fallback response per target once the queue is drained.
    sticky: BTreeMap<PullTarget, PullResponse>,
    /// Fetch count per target.
    hits: BTreeMap<PullTarget, usize>,
}

/// A pull source that replays scripted responses and failures.
///
/// Resolution order per fetch: the next queued one-shot outcome, then the
/// sticky fallback, then a transport failure. Thread-safe and cloneable,
/// so tests keep a handle while the runner owns another.
#[derive(Debug, Clone, Default)]
pub struct MockPullChannel {
    inner: Arc<Mutex<MockPullInner>>,
}

impl MockPullChannel {
    /// Create an empty mock: every fetch fails until scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot successful response for a target.
    pub fn with_response(self, target: PullTarget, response: PullResponse) -> Self {
        self.lock().scripted.entry(target).or_default().push_back(Ok(response));
        self
    }

    /// Queue a one-shot transport failure for a target.
    pub fn with_failure(self, target: PullTarget, message: impl Into<String>) -> Self {
        self.lock()
            .scripted
            .entry(target)
            .or_default()
            .push_back(Err(message.into()));
        self
    }

    /// Set the fallback response returned once a target's queue is drained.
    pub fn with_sticky(self, target: PullTarget, response: PullResponse) -> Self {
        self.lock().sticky.insert(target, response);
        self
    }

    /// Number of fetches issued for a target so far.
    pub fn hits(&self, target: &PullTarget) -> usize {
        self.lock().hits.get(target).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockPullInner> {
        self.inner.lock().expect("mock pull lock poisoned")
    }
}

#[async_trait]
impl PullSource for MockPullChannel {
    async fn fetch(&self, target: &PullTarget) -> Result<PullResponse, CalviewError> {
        let mut inner = self.lock();
        *inner.hits.entry(target.clone()).or_default() += 1;

        if let Some(outcome) = inner.scripted.get_mut(target).and_then(|q| q.pop_front()) {
            return outcome.map_err(CalviewError::Transport);
        }
        if let Some(response) = inner.sticky.get(target) {
            return Ok(response.clone());
        }
        Err(CalviewError::Transport(format!(
            "no scripted response for {target:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// One recorded engine effect.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    LogAppended(LogStream),
    StatusChanged(String, String, StatusCode),
    AggregateChanged(String, DetectorAggregate),
    RefetchRequested(String, String),
    PayloadReady(String, String, serde_json::Value),
    InputsEnabled(bool),
    PromptRequested(u64),
    PromptShown(String),
    PromptHidden,
    SessionStateChanged(SessionState),
    ActionUpdated(String),
    StatusUnavailable,
    Diagnostic(String),
}

/// A sink that records every effect in call order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded effects, in order.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// The prompt epochs requested so far.
    pub fn prompt_requests(&self) -> Vec<u64> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::PromptRequested(epoch) => Some(*epoch),
                _ => None,
            })
            .collect()
    }

    /// The prompts shown so far.
    pub fn prompts_shown(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::PromptShown(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// The input-enablement values seen so far.
    pub fn inputs(&self) -> Vec<bool> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::InputsEnabled(enabled) => Some(*enabled),
                _ => None,
            })
            .collect()
    }

    /// The delivered payloads so far, as `(tag, detector, payload)`.
    pub fn payloads(&self) -> Vec<(String, String, serde_json::Value)> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::PayloadReady(tag, det, payload) => {
                    Some((tag.clone(), det.clone(), payload.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// The status changes seen so far, as `(tag, detector, status)`.
    pub fn status_changes(&self) -> Vec<(String, String, StatusCode)> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::StatusChanged(tag, det, status) => {
                    Some((tag.clone(), det.clone(), *status))
                }
                _ => None,
            })
            .collect()
    }

    /// Number of recorded events matching a predicate.
    pub fn count(&self, pred: impl Fn(&SinkEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(e)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEvent>> {
        self.events.lock().expect("recording sink lock poisoned")
    }

    fn push(&self, event: SinkEvent) {
        self.lock().push(event);
    }
}

impl ViewSink for RecordingSink {
    fn log_appended(&self, stream: LogStream) {
        self.push(SinkEvent::LogAppended(stream));
    }
    fn status_changed(&self, tag: &str, detector: &str, status: StatusCode) {
        self.push(SinkEvent::StatusChanged(tag.into(), detector.into(), status));
    }
    fn aggregate_changed(&self, detector: &str, aggregate: DetectorAggregate) {
        self.push(SinkEvent::AggregateChanged(detector.into(), aggregate));
    }
    fn refetch_requested(&self, tag: &str, detector: &str) {
        self.push(SinkEvent::RefetchRequested(tag.into(), detector.into()));
    }
    fn payload_ready(&self, tag: &str, detector: &str, payload: &serde_json::Value) {
        self.push(SinkEvent::PayloadReady(tag.into(), detector.into(), payload.clone()));
    }
    fn inputs_enabled(&self, enabled: bool) {
        self.push(SinkEvent::InputsEnabled(enabled));
    }
    fn prompt_requested(&self, epoch: u64) {
        self.push(SinkEvent::PromptRequested(epoch));
    }
    fn prompt_shown(&self, text: &str) {
        self.push(SinkEvent::PromptShown(text.into()));
    }
    fn prompt_hidden(&self) {
        self.push(SinkEvent::PromptHidden);
    }
    fn session_state_changed(&self, state: SessionState) {
        self.push(SinkEvent::SessionStateChanged(state));
    }
    fn action_updated(&self, name: &str) {
        self.push(SinkEvent::ActionUpdated(name.into()));
    }
    fn status_unavailable(&self) {
        self.push(SinkEvent::StatusUnavailable);
    }
    fn diagnostic(&self, entry: &LogEntry) {
        self.push(SinkEvent::Diagnostic(entry.message.clone()));
    }
}
