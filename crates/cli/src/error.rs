use critique_client::RemoteError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

pub const MSG_NO_SELECTION: &str = "Please select one or more frames to analyze.";
pub const MSG_TIMEOUT: &str = "Analysis timed out. Try selecting fewer or simpler frames.";
pub const MSG_TOO_LARGE: &str = "Design too complex. Please select fewer frames.";
pub const MSG_RATE_LIMITED: &str = "Too many requests. Please wait 30 seconds and try again.";
pub const MSG_UNAVAILABLE: &str =
    "Analysis service temporarily unavailable. Please try again in a few minutes.";
pub const MSG_NETWORK: &str = "Network error. Please check your connection and try again.";
pub const MSG_FAILED: &str = "Analysis failed. Please try again with a simpler selection.";
pub const MSG_PREPARE_FAILED: &str =
    "Failed to prepare design for analysis. Please try selecting simpler frames.";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no analyzable frames selected")]
    NoSelection,

    #[error("remote analysis failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("could not build analysis request: {0}")]
    Serialization(String),

    #[error("node {0} not found")]
    NodeNotFound(String),

    #[error("host operation failed: {0}")]
    Host(String),
}

impl PipelineError {
    /// Fixed sentence shown to the user. Never contains internal detail.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoSelection => MSG_NO_SELECTION,
            Self::Serialization(_) => MSG_PREPARE_FAILED,
            Self::Remote(remote) => match remote {
                RemoteError::Timeout => MSG_TIMEOUT,
                RemoteError::PayloadTooLarge => MSG_TOO_LARGE,
                RemoteError::RateLimited => MSG_RATE_LIMITED,
                RemoteError::ServerError { .. } | RemoteError::Service(_) => MSG_UNAVAILABLE,
                RemoteError::Network(_) => MSG_NETWORK,
                RemoteError::Http { .. }
                | RemoteError::InvalidResponse(_)
                | RemoteError::InvalidConfig(_) => MSG_FAILED,
            },
            Self::NodeNotFound(_) | Self::Host(_) => MSG_FAILED,
        }
    }
}
