//! Envelope errors and their HTTP representation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::charset::Charset;

/// Failure to unwrap a CloudEvents envelope.
///
/// Every variant renders as `400 Bad Request` with a plain text body.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request body is larger than the configured limit.
    #[error("request body exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },

    /// The body is not valid text in the declared charset.
    #[error("request body is not valid {charset}")]
    InvalidEncoding { charset: Charset },

    /// The body is not a JSON object with the expected attribute types.
    #[error("invalid cloud event: {0}")]
    Json(#[from] serde_json::Error),

    /// `data_base64` is not valid base64.
    #[error("invalid data_base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The envelope carries both `data` and `data_base64`.
    #[error("cloud event must not carry both data and data_base64")]
    ConflictingData,

    /// `datacontenttype` cannot be used as a `Content-Type` header.
    #[error("invalid datacontenttype: {0:?}")]
    InvalidHeader(String),
}

impl EnvelopeError {
    /// HTTP status used when the error is turned into a response.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for EnvelopeError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EnvelopeError::ConflictingData.to_string(),
            "cloud event must not carry both data and data_base64"
        );
        assert_eq!(
            EnvelopeError::TooLarge { limit: 16 }.to_string(),
            "request body exceeds the limit of 16 bytes"
        );
        assert_eq!(
            EnvelopeError::InvalidEncoding {
                charset: Charset::UsAscii
            }
            .to_string(),
            "request body is not valid US-ASCII"
        );
    }

    #[test]
    fn test_into_response_is_bad_request() {
        let response = EnvelopeError::ConflictingData.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
