//! Response types for invocations.
//!
//! [`InvocationResponse`] normalizes what the sidecar returned, whether the
//! callee speaks gRPC natively or HTTP tunneled through the sidecar. The body
//! type is selected at the call site with a [`ResponseKind`]:
//!
//! - [`Raw`]: bytes as delivered, the codec is never involved
//! - [`Typed<T>`]: decoded with the client's payload codec
//!
//! # Example
//!
//! ```ignore
//! let response = client.invoke::<Typed<Order>, _>(request).await?;
//!
//! match response.status() {
//!     ResponseStatus::Http(code) => println!("HTTP {}", code),
//!     ResponseStatus::Rpc(status) => println!("gRPC {}", status),
//! }
//!
//! if let Some(order) = response.into_body() {
//!     println!("Order: {:?}", order);
//! }
//! ```

use std::marker::PhantomData;

use bytes::Bytes;
use dapr_invoke_core::{CodecError, CompositeStatus, PayloadCodec, decode_payload};
use http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::{InvocationError, InvocationErrorKind};
use crate::request::InvocationRequest;

/// How the response body is materialized.
pub trait ResponseKind {
    /// The decoded body type.
    type Output;

    /// Decode a payload. An empty payload yields `None`.
    fn decode<C: PayloadCodec>(payload: Bytes, codec: &C) -> Result<Option<Self::Output>, CodecError>;
}

/// Raw bytes, copied verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl ResponseKind for Raw {
    type Output = Bytes;

    fn decode<C: PayloadCodec>(payload: Bytes, _codec: &C) -> Result<Option<Bytes>, CodecError> {
        if payload.is_empty() {
            Ok(None)
        } else {
            Ok(Some(payload))
        }
    }
}

/// A value decoded by the payload codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Typed<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned> ResponseKind for Typed<T> {
    type Output = T;

    fn decode<C: PayloadCodec>(payload: Bytes, codec: &C) -> Result<Option<T>, CodecError> {
        decode_payload(&payload, codec)
    }
}

/// Status of a completed call: exactly one of an HTTP status or a gRPC status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The callee answered over HTTP.
    Http(u16),
    /// The callee answered over gRPC.
    Rpc(CompositeStatus),
}

impl ResponseStatus {
    /// Returns true for a 2xx HTTP status or an OK gRPC status.
    pub fn is_success(&self) -> bool {
        match self {
            ResponseStatus::Http(code) => (200..300).contains(code),
            ResponseStatus::Rpc(status) => status.code().is_ok(),
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseStatus::Http(code) => write!(f, "http status {}", code),
            ResponseStatus::Rpc(status) => write!(f, "grpc status {}", status),
        }
    }
}

/// Response metadata wrapper around HTTP headers.
///
/// Values are kept as bytes; binary gRPC metadata is not base64-decoded.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    headers: HeaderMap,
}

impl Metadata {
    /// Create new metadata from HTTP headers.
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Create empty metadata.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a value as a string.
    ///
    /// Returns `None` if the key is not present or the value is not visible ASCII.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// Get a value as bytes.
    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        self.headers.get(key).map(|v| v.as_bytes())
    }

    /// Get all values for a key as bytes.
    pub fn get_all_bytes(&self, key: &str) -> impl Iterator<Item = &[u8]> {
        self.headers.get_all(key).iter().map(|v| v.as_bytes())
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.headers.contains_key(key)
    }

    /// Get the underlying HeaderMap.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Consume self and return the underlying HeaderMap.
    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }
}

impl From<HeaderMap> for Metadata {
    fn from(headers: HeaderMap) -> Self {
        Self::new(headers)
    }
}

impl From<tonic::metadata::MetadataMap> for Metadata {
    fn from(metadata: tonic::metadata::MetadataMap) -> Self {
        Self::new(metadata.into_headers())
    }
}

/// Normalized result of a completed invocation.
#[derive(Debug, Clone)]
pub struct InvocationResponse<T, B = ()> {
    request: InvocationRequest<B>,
    body: Option<T>,
    headers: Metadata,
    trailers: Metadata,
    content_type: &'static str,
    status: ResponseStatus,
}

impl<T, B> InvocationResponse<T, B> {
    pub(crate) fn new(
        request: InvocationRequest<B>,
        body: Option<T>,
        headers: Metadata,
        trailers: Metadata,
        content_type: &'static str,
        status: ResponseStatus,
    ) -> Self {
        Self {
            request,
            body,
            headers,
            trailers,
            content_type,
            status,
        }
    }

    /// The request this response answers.
    pub fn request(&self) -> &InvocationRequest<B> {
        &self.request
    }

    /// The decoded body, `None` when the callee sent an empty payload.
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    /// Extract the body, discarding everything else.
    pub fn into_body(self) -> Option<T> {
        self.body
    }

    pub fn headers(&self) -> &Metadata {
        &self.headers
    }

    pub fn trailers(&self) -> &Metadata {
        &self.trailers
    }

    /// `application/json` for HTTP callees, `application/grpc` otherwise.
    pub fn content_type(&self) -> &str {
        self.content_type
    }

    pub fn status(&self) -> &ResponseStatus {
        &self.status
    }

    /// HTTP status, when the callee answered over HTTP.
    pub fn http_status(&self) -> Option<u16> {
        match &self.status {
            ResponseStatus::Http(code) => Some(*code),
            ResponseStatus::Rpc(_) => None,
        }
    }

    /// gRPC status, when the callee answered over gRPC.
    pub fn rpc_status(&self) -> Option<&CompositeStatus> {
        match &self.status {
            ResponseStatus::Http(_) => None,
            ResponseStatus::Rpc(status) => Some(status),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Fail with [`InvocationErrorKind::UnsuccessfulResponse`] unless the
    /// callee reported success.
    pub fn ensure_success(self) -> Result<Self, InvocationError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(InvocationError::new(
            self.request.app_id(),
            self.request.method(),
            InvocationErrorKind::UnsuccessfulResponse(self.status),
        ))
    }
}
