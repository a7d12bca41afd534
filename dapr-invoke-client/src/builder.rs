//! Client builder for the invocation client.
//!
//! Provides a fluent API for configuring and building an [`InvokeClient`].

use std::sync::Arc;
use std::time::Duration;

use dapr_invoke_core::{JsonCodec, JsonOptions, PayloadCodec};

use crate::client::InvokeClient;
use crate::credentials::{ApiTokenProvider, EnvApiToken};
use crate::transport::SidecarTransport;

/// Builder for creating an [`InvokeClient`].
///
/// # Example
///
/// ```ignore
/// use dapr_invoke_client::{ClientBuilder, GrpcTransport, JsonOptions};
/// use std::time::Duration;
///
/// let client = ClientBuilder::new(GrpcTransport::connect_lazy("http://127.0.0.1:50001")?)
///     .json_options(JsonOptions::pretty())
///     .timeout(Duration::from_secs(10))
///     .build();
/// ```
pub struct ClientBuilder<T, C = JsonCodec> {
    /// Transport to the sidecar.
    transport: T,
    /// Codec for typed payloads.
    codec: C,
    /// Source of the `dapr-api-token` header.
    api_token: Arc<dyn ApiTokenProvider>,
    /// Client-side timeout applied to every call.
    timeout: Option<Duration>,
}

impl<T: std::fmt::Debug, C: std::fmt::Debug> std::fmt::Debug for ClientBuilder<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("transport", &self.transport)
            .field("codec", &self.codec)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<T: SidecarTransport> ClientBuilder<T, JsonCodec> {
    /// Create a new ClientBuilder for the given transport.
    ///
    /// Defaults: compact JSON payloads, the token from `DAPR_API_TOKEN`
    /// (read on every call), and no client-side timeout.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            codec: JsonCodec::default(),
            api_token: Arc::new(EnvApiToken::new()),
            timeout: None,
        }
    }

    /// Configure the JSON codec.
    pub fn json_options(mut self, options: JsonOptions) -> Self {
        self.codec = JsonCodec::new(options);
        self
    }
}

impl<T: SidecarTransport, C: PayloadCodec> ClientBuilder<T, C> {
    /// Use a different payload codec for typed bodies.
    ///
    /// Raw bodies are never passed to the codec.
    pub fn codec<C2: PayloadCodec>(self, codec: C2) -> ClientBuilder<T, C2> {
        ClientBuilder {
            transport: self.transport,
            codec,
            api_token: self.api_token,
            timeout: self.timeout,
        }
    }

    /// Set the API token provider.
    ///
    /// Use [`NoApiToken`](crate::NoApiToken) to never send a token.
    pub fn api_token<P: ApiTokenProvider>(mut self, provider: P) -> Self {
        self.api_token = Arc::new(provider);
        self
    }

    /// Set a timeout for every call.
    ///
    /// The timeout is propagated to the sidecar via the `grpc-timeout` header
    /// and enforced locally. An expired call fails with
    /// [`InvocationErrorKind::DeadlineExceeded`](crate::InvocationErrorKind::DeadlineExceeded).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the InvokeClient.
    pub fn build(self) -> InvokeClient<T, C> {
        InvokeClient::new(self.transport, self.codec, self.api_token, self.timeout)
    }
}
