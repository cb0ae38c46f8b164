use async_trait::async_trait;
use critique_protocol::AnalysisRequest;

use crate::error::Result;

/// Raw reply of one POST, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One request/response exchange with the analysis service.
///
/// Implementations report only transport failures (`Network`, `Timeout`);
/// status and body interpretation belong to the client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: &AnalysisRequest) -> Result<TransportResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: &AnalysisRequest) -> Result<TransportResponse> {
        log::debug!(
            "POST {} ({} frames)",
            self.endpoint,
            request.frame_count()
        );
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        log::debug!("analysis service replied HTTP {status} ({} bytes)", body.len());
        Ok(TransportResponse { status, body })
    }
}
