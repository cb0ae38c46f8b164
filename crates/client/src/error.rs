use thiserror::Error;

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Outcome taxonomy of one call to the analysis service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("request timed out")]
    Timeout,

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("rate limited")]
    RateLimited,

    #[error("server error (HTTP {status})")]
    ServerError { status: u16 },

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    /// Explicit `error` field in an otherwise successful response
    #[error("service error: {0}")]
    Service(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl RemoteError {
    /// Transient kinds worth one more attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ServerError { .. } | Self::Network(_)
        )
    }

    /// Classify a non-success HTTP status. `None` for 2xx.
    #[must_use]
    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            408 => Some(Self::Timeout),
            413 => Some(Self::PayloadTooLarge),
            429 => Some(Self::RateLimited),
            500..=u16::MAX => Some(Self::ServerError { status }),
            _ => Some(Self::Http { status }),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_classification() {
        assert_eq!(RemoteError::from_status(200), None);
        assert_eq!(RemoteError::from_status(204), None);
        assert_eq!(RemoteError::from_status(408), Some(RemoteError::Timeout));
        assert_eq!(RemoteError::from_status(413), Some(RemoteError::PayloadTooLarge));
        assert_eq!(RemoteError::from_status(429), Some(RemoteError::RateLimited));
        assert_eq!(
            RemoteError::from_status(502),
            Some(RemoteError::ServerError { status: 502 })
        );
        assert_eq!(
            RemoteError::from_status(404),
            Some(RemoteError::Http { status: 404 })
        );
        assert_eq!(
            RemoteError::from_status(302),
            Some(RemoteError::Http { status: 302 })
        );
    }

    #[test]
    fn only_transient_kinds_retry() {
        assert!(RemoteError::Timeout.is_retryable());
        assert!(RemoteError::ServerError { status: 500 }.is_retryable());
        assert!(RemoteError::Network("reset".into()).is_retryable());
        assert!(!RemoteError::PayloadTooLarge.is_retryable());
        assert!(!RemoteError::RateLimited.is_retryable());
        assert!(!RemoteError::Http { status: 400 }.is_retryable());
        assert!(!RemoteError::Service("quota".into()).is_retryable());
        assert!(!RemoteError::InvalidResponse("eof".into()).is_retryable());
    }
}
