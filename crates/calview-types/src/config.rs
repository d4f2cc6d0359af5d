//! Configuration for a Calview engine instance.
//!
//! [`EngineConfig`] is the top-level configuration loaded from
//! `calview.toml`, controlling buffer bounds, retry behavior, and polling
//! intervals. All knobs are constructor-time parameters; nothing here is
//! runtime-mutable.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::CalviewError;

/// Default bound for the monitor log buffer.
pub const DEFAULT_MONITOR_LOG_CAPACITY: usize = 500;

/// Default bound for the command log buffer.
pub const DEFAULT_COMMAND_LOG_CAPACITY: usize = 200;

const DEFAULT_RETRY_INTERVAL_MS: u64 = 500;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_REFETCH_DELAY_MS: u64 = 1_000;

/// Retry behavior for one pull request: fixed interval between attempts,
/// bounded attempt count. Stateless configuration -- each issued request
/// owns its own attempt counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between attempts, milliseconds.
    #[serde(default = "default_retry_interval_ms")]
    pub interval_ms: u64,
    /// Number of retries after the initial attempt.
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

fn default_retry_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// The retry interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Top-level configuration for a Calview engine instance.
///
/// Loaded from `calview.toml`; every field has a serde default so a partial
/// file (or an empty one) yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Bound of the monitor log buffer.
    #[serde(default = "default_monitor_capacity")]
    pub monitor_log_capacity: usize,
    /// Bound of the command log buffer.
    #[serde(default = "default_command_capacity")]
    pub command_log_capacity: usize,
    /// Default retry policy for pull requests.
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Interval of the periodic status-refresh poll, milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay before re-issuing a heavy-payload fetch that came back with
    /// `update_pending`, milliseconds.
    #[serde(default = "default_refetch_delay_ms")]
    pub refetch_delay_ms: u64,
}

fn default_monitor_capacity() -> usize {
    DEFAULT_MONITOR_LOG_CAPACITY
}

fn default_command_capacity() -> usize {
    DEFAULT_COMMAND_LOG_CAPACITY
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_refetch_delay_ms() -> u64 {
    DEFAULT_REFETCH_DELAY_MS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            monitor_log_capacity: DEFAULT_MONITOR_LOG_CAPACITY,
            command_log_capacity: DEFAULT_COMMAND_LOG_CAPACITY,
            retry: RetryPolicy::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            refetch_delay_ms: DEFAULT_REFETCH_DELAY_MS,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, CalviewError> {
        toml::from_str(content).map_err(|e| CalviewError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, CalviewError> {
        toml::to_string_pretty(self).map_err(|e| CalviewError::Config(e.to_string()))
    }

    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The pending-payload re-fetch delay as a [`Duration`].
    pub fn refetch_delay(&self) -> Duration {
        Duration::from_millis(self.refetch_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_toml_roundtrip() {
        let config = EngineConfig {
            monitor_log_capacity: 100,
            command_log_capacity: 50,
            retry: RetryPolicy {
                interval_ms: 250,
                max_attempts: 5,
            },
            poll_interval_ms: 1_000,
            refetch_delay_ms: 750,
        };

        let toml_str = config.to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let parsed = EngineConfig::from_toml("").unwrap();
        assert_eq!(parsed, EngineConfig::default());
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let parsed = EngineConfig::from_toml("monitor_log_capacity = 42").unwrap();
        assert_eq!(parsed.monitor_log_capacity, 42);
        assert_eq!(parsed.command_log_capacity, DEFAULT_COMMAND_LOG_CAPACITY);
        assert_eq!(parsed.retry, RetryPolicy::default());
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = EngineConfig::from_toml("monitor_log_capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, CalviewError::Config(_)));
    }

    #[test]
    fn durations() {
        let policy = RetryPolicy {
            interval_ms: 500,
            max_attempts: 2,
        };
        assert_eq!(policy.interval(), Duration::from_millis(500));

        let config = EngineConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        assert_eq!(config.refetch_delay(), Duration::from_millis(DEFAULT_REFETCH_DELAY_MS));
    }
}
