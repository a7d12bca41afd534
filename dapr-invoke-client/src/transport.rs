//! Transport to the sidecar.
//!
//! [`SidecarTransport`] is the seam between the invocation resolver and the
//! network. [`GrpcTransport`] implements it over a tonic [`Channel`]; tests
//! substitute an in-memory implementation.
//!
//! # Example
//!
//! ```ignore
//! use dapr_invoke_client::GrpcTransport;
//!
//! // Connect eagerly
//! let transport = GrpcTransport::connect("http://127.0.0.1:50001").await?;
//!
//! // Or defer the connection to the first call
//! let transport = GrpcTransport::connect_lazy("http://127.0.0.1:50001")?;
//! ```

use std::future::Future;

use http::uri::PathAndQuery;
use tonic::metadata::MetadataMap;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Status};
use tonic_prost::ProstCodec;

use crate::proto::{INVOKE_SERVICE_PATH, InvokeResponse, InvokeServiceRequest};

/// Everything the sidecar returned for a successful call.
#[derive(Debug, Clone, Default)]
pub struct SidecarReply {
    /// Response headers.
    pub headers: MetadataMap,
    /// The response message.
    pub message: InvokeResponse,
    /// Response trailers.
    pub trailers: MetadataMap,
}

/// A connection to the sidecar able to run `InvokeService`.
///
/// Implementations must be cheap to clone and safe to share across
/// concurrent calls.
pub trait SidecarTransport: Clone + Send + Sync + 'static {
    /// Issue one `InvokeService` call.
    fn invoke_service(
        &self,
        request: Request<InvokeServiceRequest>,
    ) -> impl Future<Output = Result<SidecarReply, Status>> + Send;
}

/// gRPC transport over a tonic channel.
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    channel: Channel,
}

impl GrpcTransport {
    /// Wrap an existing channel.
    pub fn from_channel(channel: Channel) -> Self {
        Self { channel }
    }

    /// Connect to the sidecar's gRPC endpoint.
    pub async fn connect<S: Into<String>>(endpoint: S) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint.into())?.connect().await?;
        Ok(Self { channel })
    }

    /// Create a transport that connects on first use.
    pub fn connect_lazy<S: Into<String>>(endpoint: S) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint.into())?.connect_lazy();
        Ok(Self { channel })
    }
}

impl SidecarTransport for GrpcTransport {
    async fn invoke_service(
        &self,
        request: Request<InvokeServiceRequest>,
    ) -> Result<SidecarReply, Status> {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unknown(format!("sidecar was not ready: {}", e)))?;

        let codec = ProstCodec::<InvokeServiceRequest, InvokeResponse>::default();
        let path = PathAndQuery::from_static(INVOKE_SERVICE_PATH);

        // A unary call on the wire; the streaming API keeps headers and
        // trailers apart instead of merging them.
        let response = grpc.server_streaming(request, path, codec).await?;
        let (headers, mut stream, _extensions) = response.into_parts();

        let message = stream
            .message()
            .await?
            .ok_or_else(|| Status::internal("sidecar closed the call without a response message"))?;
        let trailers = stream.trailers().await?.unwrap_or_default();

        Ok(SidecarReply {
            headers,
            message,
            trailers,
        })
    }
}
