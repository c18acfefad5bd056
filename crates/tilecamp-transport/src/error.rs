/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection is closed; nothing can be sent until a reconnect.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The peer or the link rejected a batch.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// A connection could not be started.
    #[error("connect failed: {0}")]
    ConnectFailed(String),
}
