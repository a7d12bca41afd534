//! Wire messages of the sidecar's `InvokeService` RPC.
//!
//! Only the subset of `dapr.proto.runtime.v1` and `dapr.proto.common.v1`
//! needed for service invocation is declared here.

use prost_types::Any;

/// Fully-qualified path of the `InvokeService` method.
pub const INVOKE_SERVICE_PATH: &str = "/dapr.proto.runtime.v1.Dapr/InvokeService";

/// `dapr.proto.runtime.v1.InvokeServiceRequest`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeServiceRequest {
    /// Target application id.
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "3")]
    pub message: Option<InvokeRequest>,
}

/// `dapr.proto.common.v1.InvokeRequest`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeRequest {
    #[prost(string, tag = "1")]
    pub method: String,
    #[prost(message, optional, tag = "2")]
    pub data: Option<Any>,
    #[prost(string, tag = "3")]
    pub content_type: String,
    #[prost(message, optional, tag = "4")]
    pub http_extension: Option<HttpExtension>,
}

/// `dapr.proto.common.v1.HTTPExtension`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpExtension {
    #[prost(enumeration = "Verb", tag = "1")]
    pub verb: i32,
    /// Encoded query string, without the leading `?`.
    #[prost(string, tag = "2")]
    pub querystring: String,
}

/// `dapr.proto.common.v1.HTTPExtension.Verb`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Verb {
    None = 0,
    Get = 1,
    Head = 2,
    Post = 3,
    Put = 4,
    Delete = 5,
    Connect = 6,
    Options = 7,
    Trace = 8,
    Patch = 9,
}

/// `dapr.proto.common.v1.InvokeResponse`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeResponse {
    #[prost(message, optional, tag = "1")]
    pub data: Option<Any>,
    #[prost(string, tag = "2")]
    pub content_type: String,
}
