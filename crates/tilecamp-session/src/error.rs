//! Error types for the session layer.

/// Errors that can occur while reading or persisting the client identity.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A [`TokenStore`](crate::TokenStore) refused to persist a value.
    #[error("token store failed: {0}")]
    Store(String),

    /// Reading or writing the token file failed.
    #[error("token file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The token file exists but isn't a JSON object of strings.
    #[error("token file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
