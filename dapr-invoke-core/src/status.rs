//! Composite status and rich error detail decoding.
//!
//! A failed sidecar call may carry a serialized `google.rpc.Status` under the
//! `grpc-status-details-bin` metadata key. When the callee was an HTTP
//! application, the sidecar attaches a `google.rpc.ErrorInfo` detail whose
//! metadata holds the HTTP status code and message. [`decode_rich_status`]
//! extracts that pair into a [`CompositeStatus`].

use std::collections::HashMap;

use prost::Message;

use crate::{Code, ERROR_INFO_HTTP_CODE, ERROR_INFO_HTTP_MESSAGE, ERROR_INFO_TYPE};

/// Wire form of `google.rpc.Status`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpcStatus {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, repeated, tag = "3")]
    pub details: Vec<::prost_types::Any>,
}

/// Wire form of `google.rpc.ErrorInfo`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorInfo {
    #[prost(string, tag = "1")]
    pub reason: String,
    #[prost(string, tag = "2")]
    pub domain: String,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

/// HTTP outcome embedded in an `ErrorInfo` detail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Native RPC status plus an optional embedded HTTP outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeStatus {
    code: Code,
    message: String,
    http: Option<HttpErrorDetail>,
}

impl CompositeStatus {
    /// Create a status without an embedded HTTP outcome.
    pub fn new<S: Into<String>>(code: Code, message: S) -> Self {
        Self {
            code,
            message: message.into(),
            http: None,
        }
    }

    /// Attach an embedded HTTP outcome.
    pub fn with_http<S: Into<String>>(mut self, code: u16, message: S) -> Self {
        self.http = Some(HttpErrorDetail {
            code,
            message: message.into(),
        });
        self
    }

    /// Get the native status code.
    pub fn code(&self) -> Code {
        self.code
    }

    /// Get the native status message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the embedded HTTP outcome, if any.
    pub fn http(&self) -> Option<&HttpErrorDetail> {
        self.http.as_ref()
    }

    /// Embedded HTTP status code, if any.
    pub fn http_code(&self) -> Option<u16> {
        self.http.as_ref().map(|h| h.code)
    }

    /// Embedded HTTP error message, if any.
    pub fn http_message(&self) -> Option<&str> {
        self.http.as_ref().map(|h| h.message.as_str())
    }
}

impl std::fmt::Display for CompositeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(http) = &self.http {
            write!(f, " (http {}", http.code)?;
            if !http.message.is_empty() {
                write!(f, ": {}", http.message)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Reasons a status details payload could not be interpreted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RichStatusError {
    /// The payload is not a valid `google.rpc.Status`.
    #[error("malformed status details: {0}")]
    Status(String),

    /// The matching detail is not a valid `google.rpc.ErrorInfo`.
    #[error("malformed error info detail: {0}")]
    ErrorInfo(String),

    /// The `http.code` entry is not an HTTP status code.
    #[error("invalid http code in error info: {0:?}")]
    InvalidHttpCode(String),
}

/// Outcome of decoding a failure's status details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RichStatus {
    /// An `ErrorInfo` detail was found and decoded.
    Decoded(CompositeStatus),
    /// No details payload, or no `ErrorInfo` among the details.
    Absent,
    /// A payload was present but could not be interpreted.
    Undecodable(RichStatusError),
}

impl RichStatus {
    /// Consume into the decoded status, if any.
    pub fn into_composite(self) -> Option<CompositeStatus> {
        match self {
            RichStatus::Decoded(status) => Some(status),
            RichStatus::Absent | RichStatus::Undecodable(_) => None,
        }
    }
}

/// Strip the resolver prefix from an `Any` type URL.
///
/// `type.googleapis.com/google.rpc.ErrorInfo` becomes `google.rpc.ErrorInfo`.
pub fn any_type_name(type_url: &str) -> &str {
    match type_url.rfind('/') {
        Some(idx) => &type_url[idx + 1..],
        None => type_url,
    }
}

/// Decode the `grpc-status-details-bin` payload of a failed call.
///
/// Only the first `google.rpc.ErrorInfo` detail is consulted. The HTTP code
/// defaults to `0` and the message to empty when their metadata keys are
/// missing.
pub fn decode_rich_status(details: Option<&[u8]>) -> RichStatus {
    let Some(details) = details else {
        return RichStatus::Absent;
    };

    let status = match RpcStatus::decode(details) {
        Ok(status) => status,
        Err(e) => return RichStatus::Undecodable(RichStatusError::Status(e.to_string())),
    };

    let Some(detail) = status
        .details
        .iter()
        .find(|d| any_type_name(&d.type_url) == ERROR_INFO_TYPE)
    else {
        return RichStatus::Absent;
    };

    let info = match ErrorInfo::decode(detail.value.as_slice()) {
        Ok(info) => info,
        Err(e) => return RichStatus::Undecodable(RichStatusError::ErrorInfo(e.to_string())),
    };

    let raw_code = info
        .metadata
        .get(ERROR_INFO_HTTP_CODE)
        .map(String::as_str)
        .unwrap_or("0");
    let http_code = match raw_code.trim().parse::<u16>() {
        Ok(code) => code,
        Err(_) => {
            return RichStatus::Undecodable(RichStatusError::InvalidHttpCode(raw_code.to_string()));
        }
    };
    let http_message = info
        .metadata
        .get(ERROR_INFO_HTTP_MESSAGE)
        .cloned()
        .unwrap_or_default();

    RichStatus::Decoded(
        CompositeStatus::new(Code::from_i32(status.code), status.message)
            .with_http(http_code, http_message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::Any;

    fn error_info_any(entries: &[(&str, &str)]) -> Any {
        let info = ErrorInfo {
            reason: "ERR_DIRECT_INVOKE".to_string(),
            domain: "dapr.io".to_string(),
            metadata: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        Any {
            type_url: "type.googleapis.com/google.rpc.ErrorInfo".to_string(),
            value: info.encode_to_vec(),
        }
    }

    fn status_bytes(code: i32, message: &str, details: Vec<Any>) -> Vec<u8> {
        RpcStatus {
            code,
            message: message.to_string(),
            details,
        }
        .encode_to_vec()
    }

    #[test]
    fn test_absent_without_payload() {
        assert_eq!(decode_rich_status(None), RichStatus::Absent);
    }

    #[test]
    fn test_decodes_error_info() {
        let bytes = status_bytes(
            8,
            "rate limited",
            vec![error_info_any(&[
                ("http.code", "429"),
                ("http.error_message", "too many requests"),
            ])],
        );

        let status = decode_rich_status(Some(&bytes)).into_composite().unwrap();
        assert_eq!(status.code(), Code::ResourceExhausted);
        assert_eq!(status.message(), "rate limited");
        assert_eq!(status.http_code(), Some(429));
        assert_eq!(status.http_message(), Some("too many requests"));
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let bytes = status_bytes(2, "boom", vec![error_info_any(&[])]);

        let status = decode_rich_status(Some(&bytes)).into_composite().unwrap();
        assert_eq!(status.http_code(), Some(0));
        assert_eq!(status.http_message(), Some(""));
    }

    #[test]
    fn test_absent_without_error_info() {
        let other = Any {
            type_url: "type.googleapis.com/google.rpc.RetryInfo".to_string(),
            value: vec![],
        };
        let bytes = status_bytes(14, "unavailable", vec![other]);
        assert_eq!(decode_rich_status(Some(&bytes)), RichStatus::Absent);
    }

    #[test]
    fn test_first_matching_detail_wins() {
        let bytes = status_bytes(
            2,
            "unknown",
            vec![
                error_info_any(&[("http.code", "404"), ("http.error_message", "first")]),
                error_info_any(&[("http.code", "500"), ("http.error_message", "second")]),
            ],
        );

        let status = decode_rich_status(Some(&bytes)).into_composite().unwrap();
        assert_eq!(status.http_code(), Some(404));
        assert_eq!(status.http_message(), Some("first"));
    }

    #[test]
    fn test_malformed_payload_is_undecodable() {
        let outcome = decode_rich_status(Some(&[0xff, 0xff, 0xff]));
        assert!(matches!(
            outcome,
            RichStatus::Undecodable(RichStatusError::Status(_))
        ));
        assert!(outcome.into_composite().is_none());
    }

    #[test]
    fn test_non_numeric_http_code_is_undecodable() {
        let bytes = status_bytes(2, "x", vec![error_info_any(&[("http.code", "teapot")])]);
        assert_eq!(
            decode_rich_status(Some(&bytes)),
            RichStatus::Undecodable(RichStatusError::InvalidHttpCode("teapot".to_string()))
        );
    }

    #[test]
    fn test_any_type_name() {
        assert_eq!(
            any_type_name("type.googleapis.com/google.rpc.ErrorInfo"),
            "google.rpc.ErrorInfo"
        );
        assert_eq!(any_type_name("google.rpc.ErrorInfo"), "google.rpc.ErrorInfo");
    }

    #[test]
    fn test_composite_status_display() {
        let status = CompositeStatus::new(Code::Unknown, "boom").with_http(500, "server error");
        assert_eq!(status.to_string(), "unknown: boom (http 500: server error)");

        let status = CompositeStatus::new(Code::Ok, "");
        assert_eq!(status.to_string(), "ok");
    }
}
