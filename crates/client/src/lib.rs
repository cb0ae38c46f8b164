//! Resilient client for the remote critique service.
//!
//! ```text
//! AnalysisRequest ──► CritiqueClient::submit
//!                        │  timeout tier by frame count
//!                        ▼
//!                     Transport::post_json ──► TransportResponse{status, body}
//!                        │
//!                        ├─ 408/413/429/5xx/other ──► RemoteError
//!                        └─ 2xx ──► envelope {content | error}
//!
//! Attempting ─ok─► Succeeded
//!     │ retryable && attempts left
//!     ▼
//!  Waiting (retry delay) ─► Attempting
//!     otherwise ─► Failed(last error)
//! ```

mod client;
mod config;
mod error;
mod transport;

pub use client::{interpret_response, CritiqueClient, EMPTY_CRITIQUE};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::{RemoteError, Result};
pub use transport::{HttpTransport, Transport, TransportResponse};
