//! Service invocation client for applications behind a Dapr sidecar.
//!
//! This crate calls methods on other applications through the sidecar's
//! `InvokeService` gRPC API and normalizes the outcome, whether the callee is
//! served over HTTP or gRPC.
//!
//! ## Features
//!
//! - Typed bodies through a pluggable [`PayloadCodec`] (JSON by default)
//! - Raw byte bodies that bypass the codec
//! - HTTP verb, query string and header forwarding via [`HttpExtension`]
//! - Rich error decoding of `google.rpc.ErrorInfo` details into a [`CompositeStatus`]
//! - Cancellation through a [`CancellationToken`] and an optional client timeout
//! - API token injection through an [`ApiTokenProvider`]
//!
//! ## Example
//!
//! ```ignore
//! use dapr_invoke_client::{GrpcTransport, InvokeClient};
//!
//! let transport = GrpcTransport::connect("http://127.0.0.1:50001").await?;
//! let client = InvokeClient::builder(transport).build();
//!
//! // Typed in, typed out
//! let order: Option<Order> = client
//!     .invoke_method("orders", "orders/42", &OrderQuery::default())
//!     .await?;
//!
//! // Raw bytes in, raw bytes out
//! let blob = client.invoke_method_raw("blobs", "get", "key-1").await?;
//! ```
//!
//! ## Inspecting the response
//!
//! ```ignore
//! use dapr_invoke_client::{HttpExtension, InvocationRequest, ResponseStatus};
//! use http::Method;
//!
//! let request = InvocationRequest::new("orders", "orders")
//!     .with_http(HttpExtension::new(Method::GET).query("limit", "10"));
//! let response = client.invoke_raw(request).await?;
//!
//! match response.status() {
//!     ResponseStatus::Http(code) => println!("callee answered HTTP {}", code),
//!     ResponseStatus::Rpc(status) => println!("callee answered {}", status),
//! }
//! ```
//!
//! ## Errors
//!
//! Every failure is an [`InvocationError`] naming the app id and method. When
//! the sidecar attaches an `ErrorInfo` detail carrying `http.code`, the error
//! exposes it through [`InvocationError::composite_status`]:
//!
//! ```ignore
//! match client.invoke_raw(request).await {
//!     Err(err) => match err.composite_status().and_then(|s| s.http_code()) {
//!         Some(429) => backoff().await,
//!         _ => return Err(err.into()),
//!     },
//!     Ok(response) => handle(response),
//! }
//! ```

pub mod builder;
pub mod client;
pub mod credentials;
pub mod error;
pub mod proto;
pub mod request;
pub mod response;
pub mod transport;

pub use builder::ClientBuilder;
pub use client::InvokeClient;
pub use credentials::{ApiTokenProvider, EnvApiToken, NoApiToken, StaticApiToken};
pub use error::{InvocationError, InvocationErrorKind};
pub use request::{HttpExtension, InvocationRequest, RequestBody};
pub use response::{InvocationResponse, Metadata, Raw, ResponseKind, ResponseStatus, Typed};
pub use transport::{GrpcTransport, SidecarReply, SidecarTransport};

// Re-export core types
pub use dapr_invoke_core::{
    Code, CodecError, CompositeStatus, HttpErrorDetail, JsonCodec, JsonOptions, PayloadCodec,
    RichStatus, decode_rich_status,
};

pub use tokio_util::sync::CancellationToken;
