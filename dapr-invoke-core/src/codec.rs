//! Payload codec trait and implementations.
//!
//! This module provides the [`PayloadCodec`] trait that turns typed values into
//! transport-neutral bytes and back, and [`JsonCodec`], the default
//! implementation backed by `serde_json`.
//!
//! Raw byte payloads never pass through a codec; see [`encode_payload`] and
//! [`decode_payload`].

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

use crate::CodecError;

/// Codec trait for invocation payloads.
///
/// # Example
///
/// ```ignore
/// use dapr_invoke_core::{CodecError, PayloadCodec};
/// use bytes::Bytes;
///
/// struct CborCodec;
///
/// impl PayloadCodec for CborCodec {
///     fn media_type(&self) -> &'static str { "application/cbor" }
///
///     fn encode<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, CodecError> {
///         // ... cbor serialization
///     }
///
///     fn decode<T: serde::de::DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
///         // ... cbor deserialization
///     }
/// }
/// ```
pub trait PayloadCodec: Send + Sync + 'static {
    /// Media type of the bytes this codec produces.
    fn media_type(&self) -> &'static str;

    /// Encode a value.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, CodecError>;

    /// Decode a value.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// Serialization options for [`JsonCodec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Emit indented JSON instead of the compact form.
    pub pretty: bool,
}

impl JsonOptions {
    /// Compact output (the default).
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// JSON codec using serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    options: JsonOptions,
}

impl JsonCodec {
    /// Create a codec with the given options.
    pub fn new(options: JsonOptions) -> Self {
        Self { options }
    }

    /// Get the configured options.
    pub fn options(&self) -> JsonOptions {
        self.options
    }
}

impl PayloadCodec for JsonCodec {
    fn media_type(&self) -> &'static str {
        crate::JSON_MEDIA_TYPE
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, CodecError> {
        let encoded = if self.options.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        encoded
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(format!("JSON encoding failed: {}", e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes)
            .map_err(|e| CodecError::Decode(format!("JSON decoding failed: {}", e)))
    }
}

/// Encode a typed value with `codec`.
pub fn encode_payload<T, C>(value: &T, codec: &C) -> Result<Bytes, CodecError>
where
    T: Serialize + ?Sized,
    C: PayloadCodec,
{
    codec.encode(value)
}

/// Decode a payload with `codec`.
///
/// An empty payload yields `None` without invoking the codec.
pub fn decode_payload<T, C>(bytes: &[u8], codec: &C) -> Result<Option<T>, CodecError>
where
    T: DeserializeOwned,
    C: PayloadCodec,
{
    if bytes.is_empty() {
        return Ok(None);
    }
    codec.decode(bytes).map(Some)
}
