//! Configuration for the event processor.
//!
//! The struct is plain data with serde support so applications can embed
//! it in their own config files; loading those files is left to the
//! application.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::events::DEFAULT_CHANNEL_BUFFER;

/// Default wait timeout used by [`EventProcessor::wait_for`](crate::processors::EventProcessor::wait_for).
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Errors raised by [`EventProcessorConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation error: {0}")]
    ValidationError(String),
}

/// How ongoing-subscription callbacks are invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OngoingDispatch {
    /// Call the callback on the thread that is processing the event.
    ///
    /// A slow callback delays every event queued behind it on that thread.
    #[default]
    Inline,
    /// Run each subscription's callback on its own task on the tokio
    /// runtime current at attach time. Events reach a subscription in
    /// processing order through an unbounded queue. Without a runtime at
    /// attach time the callback runs inline.
    Spawn,
}

/// Processor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventProcessorConfig {
    /// Timeout for waits that do not pass one explicitly.
    pub default_timeout_ms: u64,
    /// Callback invocation mode for ongoing subscriptions.
    pub ongoing_dispatch: OngoingDispatch,
    /// Buffer size of channels returned by `subscribe`.
    pub channel_capacity: usize,
}

impl Default for EventProcessorConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            ongoing_dispatch: OngoingDispatch::Inline,
            channel_capacity: DEFAULT_CHANNEL_BUFFER,
        }
    }
}

impl EventProcessorConfig {
    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "default_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace unusable zero values with their defaults.
    pub fn sanitized(mut self) -> Self {
        if self.default_timeout_ms == 0 {
            warn!(
                fallback_ms = DEFAULT_TIMEOUT_MS,
                "default_timeout_ms is zero, using the default"
            );
            self.default_timeout_ms = DEFAULT_TIMEOUT_MS;
        }
        if self.channel_capacity == 0 {
            warn!(
                fallback = DEFAULT_CHANNEL_BUFFER,
                "channel_capacity is zero, using the default"
            );
            self.channel_capacity = DEFAULT_CHANNEL_BUFFER;
        }
        self
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn with_ongoing_dispatch(mut self, dispatch: OngoingDispatch) -> Self {
        self.ongoing_dispatch = dispatch;
        self
    }
}
