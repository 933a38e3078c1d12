//! Error types for the transport layer.

/// Errors that can occur on a listener or a connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending a frame failed; the peer is likely gone.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving a frame failed mid-stream.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or upgrading an incoming connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
