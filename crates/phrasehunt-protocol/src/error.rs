//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown event kind, or a
    /// payload of the wrong shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The `event` field named a kind this server does not handle.
    #[error("unsupported event kind {0:?}")]
    UnknownEvent(String),

    /// The event kind is known but its `data` is not what the kind expects.
    #[error("invalid payload for {event}: expected {expected}")]
    InvalidPayload {
        event: &'static str,
        expected: &'static str,
    },
}
