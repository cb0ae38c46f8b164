use thiserror::Error;

/// Result type for host-boundary conversions
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised while adapting host data into typed design nodes
#[derive(Error, Debug)]
pub enum AdapterError {
    /// A node without an identity cannot be selected or highlighted later
    #[error("node '{name}' has no id")]
    MissingId { name: String },

    /// The document is not a node or a list of nodes
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// JSON decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdapterError {
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }
}
