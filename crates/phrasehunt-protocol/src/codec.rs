//! Codec trait and the JSON implementation.
//!
//! The server only ever needs JSON (browsers speak it natively), but the
//! handler is written against [`Codec`] so tests and alternative front ends
//! can swap the encoding without touching dispatch.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts events to bytes and back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use phrasehunt_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let event: ClientEvent = JsonCodec
///     .decode(br#"{"event":"submit_word","data":"cat"}"#)
///     .unwrap();
/// assert_eq!(event, ClientEvent::SubmitWord("cat".into()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
