use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/proxy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Total attempts including the first
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
    /// Used when the request carries more than `large_request_frames` frames
    pub large_timeout_ms: u64,
    pub large_request_frames: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_attempts: 2,
            retry_delay_ms: 2_000,
            timeout_ms: 25_000,
            large_timeout_ms: 35_000,
            large_request_frames: 5,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(RemoteError::InvalidConfig(
                "client.endpoint must not be empty".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(RemoteError::InvalidConfig(
                "client.max_attempts must be > 0".to_string(),
            ));
        }
        if self.timeout_ms == 0 || self.large_timeout_ms == 0 {
            return Err(RemoteError::InvalidConfig(
                "client timeouts must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn timeout_for(&self, frame_count: usize) -> Duration {
        if frame_count > self.large_request_frames {
            Duration::from_millis(self.large_timeout_ms)
        } else {
            Duration::from_millis(self.timeout_ms)
        }
    }

    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
