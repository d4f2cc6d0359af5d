//! HTTP pull channel.
//!
//! A small REST surface on the controller serves the pull resources:
//! bulk log dumps, heavy per-detector payloads, the pending prompt text,
//! and the current session state. Every response carries an `ok`/`error`
//! envelope.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use calview_engine::{PullResponse, PullSource, PullTarget};
use calview_types::{CalviewError, LogStream, SessionState};

use crate::channel::ChannelError;
use crate::decode;

/// Pull client for the controller's REST surface.
#[derive(Debug, Clone)]
pub struct HttpPullClient {
    client: Client,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct DumpResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    entries: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PayloadResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    update_pending: bool,
}

#[derive(Debug, Deserialize)]
struct PromptResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    state: Option<SessionState>,
}

impl HttpPullClient {
    /// Create a client for the given controller base URL.
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    /// Like [`new`](Self::new), with a caller-configured reqwest client
    /// (timeouts, proxies).
    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Fetch one pull resource.
    pub async fn fetch(&self, target: &PullTarget) -> Result<PullResponse, ChannelError> {
        debug!(?target, "pull request");
        match target {
            PullTarget::LogDump(stream) => {
                let path = match stream {
                    LogStream::Monitor => "log/monitor",
                    LogStream::Command => "log/command",
                };
                let dump: DumpResponse = self.get(path).await?;
                check_ok(dump.ok, dump.error)?;
                Ok(PullResponse::LogDump(decode::decode_log_dump(&dump.entries)))
            }
            PullTarget::DetectorPayload { tag, detector } => {
                let resp: PayloadResponse =
                    self.get(&format!("payload/{tag}/{detector}")).await?;
                check_ok(resp.ok, resp.error)?;
                Ok(PullResponse::DetectorPayload {
                    payload: resp.payload,
                    update_pending: resp.update_pending,
                })
            }
            PullTarget::PromptText => {
                let resp: PromptResponse = self.get("prompt").await?;
                check_ok(resp.ok, resp.error)?;
                Ok(PullResponse::PromptText(resp.text))
            }
            PullTarget::SessionStatus => {
                let resp: StatusResponse = self.get("status").await?;
                check_ok(resp.ok, resp.error)?;
                let state = resp.state.ok_or_else(|| {
                    ChannelError::Malformed("status response has no state".into())
                })?;
                Ok(PullResponse::SessionStatus(state))
            }
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ChannelError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| ChannelError::Malformed(format!("bad pull path {path}: {e}")))?;
        let response = self.client.get(url).send().await?;
        Ok(response.json().await?)
    }
}

fn check_ok(ok: bool, error: Option<String>) -> Result<(), ChannelError> {
    if ok {
        return Ok(());
    }
    Err(ChannelError::Api(
        error.unwrap_or_else(|| "unknown error".into()),
    ))
}

#[async_trait]
impl PullSource for HttpPullClient {
    async fn fetch(&self, target: &PullTarget) -> Result<PullResponse, CalviewError> {
        HttpPullClient::fetch(self, target).await.map_err(Into::into)
    }
}
