//! Unified error type for the server.

use phrasehunt_protocol::ProtocolError;
use phrasehunt_room::RoomError;
use phrasehunt_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// A connection handler that returns any of these ends that connection
/// only; nothing here is fatal to the server.
#[derive(Debug, thiserror::Error)]
pub enum PhraseHuntError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room or game operation failed.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The client sent an event its state does not allow. The connection
    /// is dropped.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let err: PhraseHuntError = err.into();
        assert!(matches!(err, PhraseHuntError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::UnknownEvent("dance".into());
        let err: PhraseHuntError = err.into();
        assert!(matches!(err, PhraseHuntError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::InvalidCode("x".into());
        let err: PhraseHuntError = err.into();
        assert!(matches!(err, PhraseHuntError::Room(_)));
    }

    #[test]
    fn test_protocol_violation_message() {
        let err = PhraseHuntError::ProtocolViolation("start_game outside a room".into());
        assert_eq!(err.to_string(), "protocol violation: start_game outside a room");
    }
}
