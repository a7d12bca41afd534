//! Well-known names shared with the sidecar.

/// Environment variable holding the sidecar API token.
pub const API_TOKEN_ENV: &str = "DAPR_API_TOKEN";

/// Request header carrying the sidecar API token.
pub const API_TOKEN_HEADER: &str = "dapr-api-token";

/// Response header set by the sidecar when the callee answered over HTTP.
pub const HTTP_STATUS_HEADER: &str = "dapr-http-status";

/// Binary metadata key carrying a serialized `google.rpc.Status`.
pub const GRPC_STATUS_DETAILS_KEY: &str = "grpc-status-details-bin";

/// Type name of the error detail that embeds an HTTP outcome.
pub const ERROR_INFO_TYPE: &str = "google.rpc.ErrorInfo";

/// `ErrorInfo` metadata key holding the HTTP status code as text.
pub const ERROR_INFO_HTTP_CODE: &str = "http.code";

/// `ErrorInfo` metadata key holding the HTTP error message.
pub const ERROR_INFO_HTTP_MESSAGE: &str = "http.error_message";

/// Media type used for JSON payloads and HTTP-shaped responses.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Media type reported for responses from gRPC-native callees.
pub const GRPC_MEDIA_TYPE: &str = "application/grpc";

/// Media type of a structured-mode CloudEvent.
pub const CLOUD_EVENTS_MEDIA_TYPE: &str = "application/cloudevents+json";

/// Trailer carrying the native gRPC status code.
pub const GRPC_STATUS_KEY: &str = "grpc-status";

/// Trailer carrying the native gRPC status message.
pub const GRPC_MESSAGE_KEY: &str = "grpc-message";
