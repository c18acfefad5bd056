//! Turning envelope batches into frames and back.
//!
//! The pipeline and the dispatcher only know the [`Codec`] trait. The
//! server speaks JSON today, so [`JsonCodec`] is the one implementation.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` so a codec can live inside a client that is
/// moved into a spawned task by the host.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one frame.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame.
    ///
    /// # Errors
    /// [`ProtocolError::Decode`] if the bytes are malformed or don't match
    /// the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use tilecamp_protocol::{Codec, Envelope, JsonCodec};
///
/// let batch = vec![Envelope {
///     type_id: "leave".into(),
///     payload: serde_json::json!({ "id": "d-4" }),
/// }];
///
/// let bytes = JsonCodec.encode(&batch).unwrap();
/// assert_eq!(bytes, br#"[["leave",{"id":"d-4"}]]"#);
///
/// let decoded: Vec<Envelope> = JsonCodec.decode(&bytes).unwrap();
/// assert_eq!(decoded, batch);
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
