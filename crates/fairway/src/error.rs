//! Unified error type for the gateway.

use fairway_game::GameError;
use fairway_protocol::ProtocolError;
use fairway_store::StoreError;
use fairway_transport::TransportError;

/// Top-level error wrapping every layer's failures.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session state-machine error.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A repository error reaching the gateway directly (connect-time
    /// authentication).
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_game_error_keeps_client_message() {
        let err: GatewayError = GameError::NotYourTurn.into();
        assert!(matches!(err, GatewayError::Game(_)));
        assert_eq!(err.to_string(), "Not your turn");
    }

    #[test]
    fn test_from_protocol_error() {
        let err: GatewayError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, GatewayError::Protocol(_)));
    }
}
