use std::time::Duration;

use critique_protocol::{AnalysisRequest, RemoteEnvelope};
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::error::{RemoteError, Result};
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Content returned when the service answers without content or error.
pub const EMPTY_CRITIQUE: &str = "[]";

/// Retry loop states. Each turn of the loop consumes one and yields the next.
#[derive(Debug)]
enum AttemptState {
    Attempting { attempt: u32 },
    Waiting { next_attempt: u32 },
    Succeeded(String),
    Failed(RemoteError),
}

/// Sends analysis requests with a size-dependent timeout and one bounded
/// retry for transient failures.
#[derive(Debug, Clone)]
pub struct CritiqueClient<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl CritiqueClient<HttpTransport> {
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.endpoint.clone())?;
        Ok(Self { transport, config })
    }
}

impl<T: Transport> CritiqueClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit `request` and return the critique text.
    ///
    /// Retryable failures (timeout, 5xx, network) get another attempt after
    /// the configured delay while attempts remain; everything else fails
    /// immediately. The last error is returned once attempts run out.
    ///
    /// Every attempt sends a fresh body whose timestamp is advanced by the
    /// time spent since the first attempt.
    pub async fn submit(&self, request: &AnalysisRequest) -> Result<String> {
        let limit = self.config.timeout_for(request.frame_count());
        let max_attempts = self.config.max_attempts.max(1);
        let started = Instant::now();
        let mut state = AttemptState::Attempting { attempt: 1 };

        loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let body = request.with_timestamp(request.timestamp.saturating_add(elapsed));
                    match self.attempt_once(&body, limit).await {
                        Ok(content) => AttemptState::Succeeded(content),
                        Err(err) if err.is_retryable() && attempt < max_attempts => {
                            log::warn!(
                                "analysis attempt {attempt}/{max_attempts} failed: {err}; retrying"
                            );
                            AttemptState::Waiting {
                                next_attempt: attempt + 1,
                            }
                        }
                        Err(err) => {
                            log::error!(
                                "analysis attempt {attempt}/{max_attempts} failed: {err}"
                            );
                            AttemptState::Failed(err)
                        }
                    }
                }
                AttemptState::Waiting { next_attempt } => {
                    tokio::time::sleep(self.config.retry_delay()).await;
                    AttemptState::Attempting {
                        attempt: next_attempt,
                    }
                }
                AttemptState::Succeeded(content) => return Ok(content),
                AttemptState::Failed(err) => return Err(err),
            };
        }
    }

    async fn attempt_once(&self, request: &AnalysisRequest, limit: Duration) -> Result<String> {
        match tokio::time::timeout(limit, self.transport.post_json(request)).await {
            Err(_) => {
                log::debug!("analysis request exceeded {}ms", limit.as_millis());
                Err(RemoteError::Timeout)
            }
            Ok(Err(err)) => Err(err),
            Ok(Ok(response)) => interpret_response(&response),
        }
    }
}

/// Classify status, then unwrap the JSON envelope.
pub fn interpret_response(response: &TransportResponse) -> Result<String> {
    if let Some(err) = RemoteError::from_status(response.status) {
        log::debug!(
            "analysis service error body: {}",
            truncate_for_log(&response.body)
        );
        return Err(err);
    }

    let envelope: RemoteEnvelope = serde_json::from_str(&response.body)
        .map_err(|err| RemoteError::InvalidResponse(err.to_string()))?;

    if let Some(content) = envelope.content_text() {
        return Ok(content);
    }
    match envelope.error {
        Some(message) if !message.is_empty() => Err(RemoteError::Service(message)),
        _ => Ok(EMPTY_CRITIQUE.to_string()),
    }
}

fn truncate_for_log(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
