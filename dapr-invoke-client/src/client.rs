//! Invocation client implementation.
//!
//! This module provides [`InvokeClient`], which issues service invocations
//! through the sidecar and reconciles the outcome into an
//! [`InvocationResponse`] or an [`InvocationError`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use dapr_invoke_core::{
    API_TOKEN_HEADER, Code, CodecError, CompositeStatus, GRPC_MEDIA_TYPE, GRPC_MESSAGE_KEY,
    GRPC_STATUS_DETAILS_KEY, GRPC_STATUS_KEY, HTTP_STATUS_HEADER, JSON_MEDIA_TYPE, JsonCodec,
    PayloadCodec, RichStatus, decode_rich_status, encode_payload,
};
use http::Method;
use prost_types::Any;
use serde::{Serialize, de::DeserializeOwned};
use tonic::metadata::{MetadataMap, MetadataValue};
#[cfg(feature = "tracing")]
use tracing::Instrument;

use crate::builder::ClientBuilder;
use crate::credentials::ApiTokenProvider;
use crate::error::{InvocationError, InvocationErrorKind};
use crate::proto::{self, InvokeServiceRequest, Verb};
use crate::request::{InvocationRequest, RequestBody};
use crate::response::{InvocationResponse, Metadata, Raw, ResponseKind, ResponseStatus, Typed};
use crate::transport::{SidecarReply, SidecarTransport};

/// Service invocation client.
///
/// The client is generic over `T`, the transport to the sidecar, and `C`, the
/// payload codec used for typed bodies (JSON by default). It is cheap to
/// clone; clones share the transport, codec and token provider.
///
/// Use [`ClientBuilder`] or [`InvokeClient::builder`] to create an instance.
///
/// # Example
///
/// ```ignore
/// use dapr_invoke_client::{GrpcTransport, InvokeClient};
///
/// let transport = GrpcTransport::connect("http://127.0.0.1:50001").await?;
/// let client = InvokeClient::builder(transport).build();
///
/// let order: Option<Order> = client
///     .invoke_method("orders", "orders/42", &OrderQuery::default())
///     .await?;
/// ```
pub struct InvokeClient<T, C = JsonCodec> {
    transport: T,
    codec: Arc<C>,
    api_token: Arc<dyn ApiTokenProvider>,
    timeout: Option<Duration>,
}

impl<T: Clone, C> Clone for InvokeClient<T, C> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            codec: Arc::clone(&self.codec),
            api_token: Arc::clone(&self.api_token),
            timeout: self.timeout,
        }
    }
}

impl<T, C> std::fmt::Debug for InvokeClient<T, C>
where
    T: std::fmt::Debug,
    C: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvokeClient")
            .field("transport", &self.transport)
            .field("codec", &self.codec)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<T: SidecarTransport> InvokeClient<T, JsonCodec> {
    /// Create a new ClientBuilder for the given transport.
    ///
    /// This is a convenience method equivalent to `ClientBuilder::new(transport)`.
    pub fn builder(transport: T) -> ClientBuilder<T, JsonCodec> {
        ClientBuilder::new(transport)
    }
}

impl<T, C> InvokeClient<T, C>
where
    T: SidecarTransport,
    C: PayloadCodec,
{
    /// Create a new InvokeClient.
    ///
    /// This is called by [`ClientBuilder::build`]. Prefer using the builder API.
    pub(crate) fn new(
        transport: T,
        codec: C,
        api_token: Arc<dyn ApiTokenProvider>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            codec: Arc::new(codec),
            api_token,
            timeout,
        }
    }

    /// Get the payload codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Get the client-side timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Invoke a method and decode the response body as `K`.
    ///
    /// # Errors
    ///
    /// Returns an [`InvocationError`] if:
    /// - the app id or method is empty (no call is made)
    /// - the HTTP verb is not supported
    /// - the body cannot be encoded or the response cannot be decoded
    /// - the call fails, is cancelled, or times out
    /// - the `dapr-http-status` header is not an integer
    pub async fn invoke<K, B>(
        &self,
        request: InvocationRequest<B>,
    ) -> Result<InvocationResponse<K::Output, B>, InvocationError>
    where
        K: ResponseKind,
        B: Serialize,
    {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "dapr.invoke",
            app_id = %request.app_id(),
            method = %request.method(),
            verb = request.http().map_or("POST", |h| h.verb().as_str()),
            otel.kind = "client",
        );

        let call = self.resolve::<K, B>(request);
        #[cfg(feature = "tracing")]
        let call = call.instrument(span);
        call.await
    }

    /// Invoke a method with a typed body and a typed response.
    ///
    /// The call uses `POST`, labels the body with the codec's media type and fails with
    /// [`InvocationErrorKind::UnsuccessfulResponse`] if the callee reports
    /// failure. Returns `None` when the callee sent no body.
    pub async fn invoke_method<Req, Res>(
        &self,
        app_id: &str,
        method: &str,
        body: &Req,
    ) -> Result<Option<Res>, InvocationError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let request = InvocationRequest::new(app_id, method).with_body(body);
        let response = self.invoke::<Typed<Res>, _>(request).await?;
        Ok(response.ensure_success()?.into_body())
    }

    /// Invoke a method and decode the response, keeping headers and status.
    pub async fn invoke_method_with_response<Res, B>(
        &self,
        request: InvocationRequest<B>,
    ) -> Result<InvocationResponse<Res, B>, InvocationError>
    where
        Res: DeserializeOwned,
        B: Serialize,
    {
        self.invoke::<Typed<Res>, B>(request).await
    }

    /// Invoke a method with raw bytes in and out.
    ///
    /// Neither direction touches the codec. An empty response yields empty bytes.
    pub async fn invoke_method_raw<D: Into<Bytes>>(
        &self,
        app_id: &str,
        method: &str,
        data: D,
    ) -> Result<Bytes, InvocationError> {
        let request = InvocationRequest::new(app_id, method).with_raw_body(data);
        let response = self.invoke::<Raw, ()>(request).await?;
        Ok(response.ensure_success()?.into_body().unwrap_or_default())
    }

    /// Invoke a method and return the raw response, keeping headers and status.
    pub async fn invoke_raw<B: Serialize>(
        &self,
        request: InvocationRequest<B>,
    ) -> Result<InvocationResponse<Bytes, B>, InvocationError> {
        self.invoke::<Raw, B>(request).await
    }

    async fn resolve<K, B>(
        &self,
        request: InvocationRequest<B>,
    ) -> Result<InvocationResponse<K::Output, B>, InvocationError>
    where
        K: ResponseKind,
        B: Serialize,
    {
        let fail = |kind: InvocationErrorKind| InvocationError::new(request.app_id(), request.method(), kind);

        // 1. Validate before touching the network
        validate(&request).map_err(fail)?;

        // 2. Build the wire message and metadata
        let message = self.build_message(&request).map_err(fail)?;
        let metadata = self.build_metadata(&request).map_err(fail)?;
        let mut grpc_request = tonic::Request::from_parts(
            metadata,
            tonic::Extensions::default(),
            message,
        );
        if let Some(limit) = self.timeout {
            grpc_request.set_timeout(limit);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("sending invocation to sidecar");

        // 3. Send, racing the cancellation token
        let reply = tokio::select! {
            biased;
            _ = request.cancellation().cancelled() => Err(InvocationErrorKind::Cancelled),
            reply = self.send(grpc_request) => reply,
        };
        let SidecarReply {
            headers,
            message,
            trailers,
        } = reply.map_err(fail)?;

        // 4. Decide the response origin
        let headers = Metadata::from(headers);
        let (status, content_type) = match headers.get_bytes(HTTP_STATUS_HEADER) {
            Some(raw) => (
                ResponseStatus::Http(parse_http_status(raw).map_err(fail)?),
                JSON_MEDIA_TYPE,
            ),
            None => (ResponseStatus::Rpc(native_status(&trailers)), GRPC_MEDIA_TYPE),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(status = %status, "invocation completed");

        // 5. Decode the body
        let payload = message
            .data
            .map(|any| Bytes::from(any.value))
            .unwrap_or_default();
        let body = K::decode(payload, &*self.codec).map_err(|e| fail(e.into()))?;

        Ok(InvocationResponse::new(
            request,
            body,
            headers,
            Metadata::from(trailers),
            content_type,
            status,
        ))
    }

    async fn send(
        &self,
        request: tonic::Request<InvokeServiceRequest>,
    ) -> Result<SidecarReply, InvocationErrorKind> {
        let call = self.transport.invoke_service(request);
        let reply = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(reply) => reply,
                Err(_) => return Err(InvocationErrorKind::DeadlineExceeded),
            },
            None => call.await,
        };
        reply.map_err(classify_failure)
    }

    fn build_message<B: Serialize>(
        &self,
        request: &InvocationRequest<B>,
    ) -> Result<InvokeServiceRequest, InvocationErrorKind> {
        // Typed bodies are labelled with the codec's media type by default
        let default_content_type = match request.body() {
            Some(RequestBody::Typed(_)) => self.codec.media_type(),
            _ => JSON_MEDIA_TYPE,
        };
        let data = match request.body() {
            None => None,
            Some(RequestBody::Raw(bytes)) => Some(bytes.clone()),
            Some(RequestBody::Typed(value)) => Some(encode_payload(value, &*self.codec)?),
        }
        .map(|bytes| Any {
            type_url: String::new(),
            value: bytes.to_vec(),
        });

        let (content_type, http_extension) = match request.http() {
            None => (
                default_content_type.to_string(),
                proto::HttpExtension {
                    verb: Verb::Post as i32,
                    querystring: String::new(),
                },
            ),
            Some(http) => {
                let querystring = if http.query_params().is_empty() {
                    String::new()
                } else {
                    serde_qs::to_string(http.query_params()).map_err(|e| {
                        CodecError::Encode(format!("invalid query string: {}", e))
                    })?
                };
                (
                    http.get_content_type()
                        .unwrap_or(default_content_type)
                        .to_string(),
                    proto::HttpExtension {
                        verb: verb_for(http.verb())? as i32,
                        querystring,
                    },
                )
            }
        };

        Ok(InvokeServiceRequest {
            id: request.app_id().to_string(),
            message: Some(proto::InvokeRequest {
                method: request.method().to_string(),
                data,
                content_type,
                http_extension: Some(http_extension),
            }),
        })
    }

    fn build_metadata<B>(
        &self,
        request: &InvocationRequest<B>,
    ) -> Result<MetadataMap, InvocationErrorKind> {
        let headers = request
            .http()
            .map(|http| http.headers().clone())
            .unwrap_or_default();
        let mut metadata = MetadataMap::from_headers(headers);

        // Re-read on every call; tokens may rotate.
        if let Some(token) = self.api_token.api_token() {
            let value = MetadataValue::try_from(token.as_str()).map_err(|_| {
                InvocationErrorKind::Protocol("api token is not a valid header value".into())
            })?;
            metadata.insert(API_TOKEN_HEADER, value);
        }

        Ok(metadata)
    }
}

fn validate<B>(request: &InvocationRequest<B>) -> Result<(), InvocationErrorKind> {
    if request.app_id().is_empty() {
        return Err(InvocationErrorKind::Validation(
            "app id must not be empty".into(),
        ));
    }
    if request.method().is_empty() {
        return Err(InvocationErrorKind::Validation(
            "method name must not be empty".into(),
        ));
    }
    Ok(())
}

/// Map an HTTP method to the sidecar's verb enumeration.
fn verb_for(method: &Method) -> Result<Verb, InvocationErrorKind> {
    match method.as_str() {
        "GET" => Ok(Verb::Get),
        "HEAD" => Ok(Verb::Head),
        "POST" => Ok(Verb::Post),
        "PUT" => Ok(Verb::Put),
        "DELETE" => Ok(Verb::Delete),
        "CONNECT" => Ok(Verb::Connect),
        "OPTIONS" => Ok(Verb::Options),
        "TRACE" => Ok(Verb::Trace),
        other => Err(InvocationErrorKind::UnsupportedOperation(format!(
            "unsupported HTTP verb: {}",
            other
        ))),
    }
}

/// Native status of a successful call, read from the trailers.
fn native_status(trailers: &MetadataMap) -> CompositeStatus {
    let code = trailers
        .get(GRPC_STATUS_KEY)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i32>().ok())
        .map_or(Code::Ok, Code::from_i32);
    let message = trailers
        .get(GRPC_MESSAGE_KEY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    CompositeStatus::new(code, message)
}

fn parse_http_status(raw: &[u8]) -> Result<u16, InvocationErrorKind> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .ok_or_else(|| {
            InvocationErrorKind::Protocol(format!(
                "invalid {} header: {:?}",
                HTTP_STATUS_HEADER,
                String::from_utf8_lossy(raw)
            ))
        })
}

/// Turn a failed call into a transport or remote-application error.
fn classify_failure(status: tonic::Status) -> InvocationErrorKind {
    let from_metadata = status
        .metadata()
        .get_bin(GRPC_STATUS_DETAILS_KEY)
        .and_then(|value| value.to_bytes().ok());
    let details = if status.details().is_empty() {
        from_metadata
    } else {
        Some(Bytes::copy_from_slice(status.details()))
    };

    match decode_rich_status(details.as_deref()) {
        RichStatus::Decoded(composite) => InvocationErrorKind::RemoteApplication { status, composite },
        RichStatus::Absent => InvocationErrorKind::Transport(status),
        RichStatus::Undecodable(reason) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %reason, "ignoring undecodable status details");
            #[cfg(not(feature = "tracing"))]
            let _ = reason;
            InvocationErrorKind::Transport(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{EnvApiToken, NoApiToken, StaticApiToken};
    use crate::proto::InvokeResponse;
    use crate::request::HttpExtension;
    use dapr_invoke_core::{ErrorInfo, RpcStatus};
    use prost::Message;
    use serde::Deserialize;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    type Responder = dyn Fn() -> Result<SidecarReply, tonic::Status> + Send + Sync;

    /// In-memory sidecar recording every request it receives.
    #[derive(Clone)]
    struct FakeSidecar {
        calls: Arc<Mutex<Vec<(MetadataMap, InvokeServiceRequest)>>>,
        respond: Arc<Responder>,
        hang: bool,
    }

    impl FakeSidecar {
        fn replying<F>(respond: F) -> Self
        where
            F: Fn() -> Result<SidecarReply, tonic::Status> + Send + Sync + 'static,
        {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                respond: Arc::new(respond),
                hang: false,
            }
        }

        fn hanging() -> Self {
            let mut sidecar = Self::replying(|| Ok(SidecarReply::default()));
            sidecar.hang = true;
            sidecar
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_call(&self) -> (MetadataMap, InvokeServiceRequest) {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl SidecarTransport for FakeSidecar {
        async fn invoke_service(
            &self,
            request: tonic::Request<InvokeServiceRequest>,
        ) -> Result<SidecarReply, tonic::Status> {
            self.calls
                .lock()
                .unwrap()
                .push((request.metadata().clone(), request.get_ref().clone()));
            if self.hang {
                std::future::pending::<()>().await;
            }
            (self.respond)()
        }
    }

    /// JSON codec that counts decode calls.
    #[derive(Default)]
    struct CountingCodec {
        decodes: AtomicUsize,
    }

    impl PayloadCodec for CountingCodec {
        fn media_type(&self) -> &'static str {
            JSON_MEDIA_TYPE
        }

        fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, CodecError> {
            JsonCodec::default().encode(value)
        }

        fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            JsonCodec::default().decode(bytes)
        }
    }

    /// JSON codec advertising a vendor media type.
    struct VendorJsonCodec;

    impl PayloadCodec for VendorJsonCodec {
        fn media_type(&self) -> &'static str {
            "application/vnd.orders+json"
        }

        fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, CodecError> {
            JsonCodec::default().encode(value)
        }

        fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
            JsonCodec::default().decode(bytes)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
    }

    fn reply_with(data: &[u8], headers: &[(&'static str, &'static str)]) -> SidecarReply {
        let mut metadata = MetadataMap::new();
        for (name, value) in headers {
            metadata.insert(*name, MetadataValue::from_static(*value));
        }
        SidecarReply {
            headers: metadata,
            message: InvokeResponse {
                data: Some(Any {
                    type_url: String::new(),
                    value: data.to_vec(),
                }),
                content_type: String::new(),
            },
            trailers: MetadataMap::new(),
        }
    }

    fn client(sidecar: FakeSidecar) -> InvokeClient<FakeSidecar> {
        InvokeClient::builder(sidecar).api_token(NoApiToken).build()
    }

    fn rich_failure(http_code: &str, http_message: &str) -> tonic::Status {
        let info = ErrorInfo {
            reason: "ERR_DIRECT_INVOKE".into(),
            domain: "dapr.io".into(),
            metadata: [
                ("http.code".to_string(), http_code.to_string()),
                ("http.error_message".to_string(), http_message.to_string()),
            ]
            .into_iter()
            .collect(),
        };
        let status = RpcStatus {
            code: tonic::Code::Unknown as i32,
            message: "invoke failed".into(),
            details: vec![Any {
                type_url: "type.googleapis.com/google.rpc.ErrorInfo".into(),
                value: info.encode_to_vec(),
            }],
        };
        tonic::Status::with_details(
            tonic::Code::Unknown,
            "invoke failed",
            Bytes::from(status.encode_to_vec()),
        )
    }

    #[tokio::test]
    async fn test_rpc_callee_yields_composite_status() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[])));
        let response = client(sidecar)
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap();

        assert_eq!(response.http_status(), None);
        let status = response.rpc_status().unwrap();
        assert_eq!(status.code(), Code::Ok);
        assert_eq!(status.message(), "");
        assert!(status.http().is_none());
        assert_eq!(response.content_type(), "application/grpc");
        assert!(response.body().is_none());
    }

    #[tokio::test]
    async fn test_http_callee_yields_http_status() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[("dapr-http-status", "404")])));
        let response = client(sidecar)
            .invoke_raw(InvocationRequest::new("orders", "missing"))
            .await
            .unwrap();

        assert_eq!(response.http_status(), Some(404));
        assert!(response.rpc_status().is_none());
        assert_eq!(response.content_type(), "application/json");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_unparsable_http_status_is_protocol_error() {
        let sidecar =
            FakeSidecar::replying(|| Ok(reply_with(b"", &[("dapr-http-status", "not-a-code")])));
        let err = client(sidecar)
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), InvocationErrorKind::Protocol(_)));
        assert_eq!(err.app_id(), "orders");
    }

    #[tokio::test]
    async fn test_raw_response_skips_codec() {
        let payload: &'static [u8] = b"\xde\xad\xbe\xef";
        let sidecar = FakeSidecar::replying(move || Ok(reply_with(payload, &[])));
        let client = InvokeClient::builder(sidecar)
            .codec(CountingCodec::default())
            .api_token(NoApiToken)
            .build();

        let response = client
            .invoke_raw(InvocationRequest::new("blobs", "get"))
            .await
            .unwrap();

        assert_eq!(response.body().map(|b| &b[..]), Some(payload));
        assert_eq!(client.codec().decodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_typed_round_trip_through_sidecar() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(br#"{"name":"jimmy"}"#, &[])));
        let client = client(sidecar.clone());

        let person: Option<Person> = client
            .invoke_method("people", "echo", &Person { name: "jimmy".into() })
            .await
            .unwrap();
        assert_eq!(person, Some(Person { name: "jimmy".into() }));

        let (_, sent) = sidecar.last_call();
        assert_eq!(sent.id, "people");
        let message = sent.message.unwrap();
        assert_eq!(message.method, "echo");
        assert_eq!(message.content_type, "application/json");
        assert_eq!(message.data.unwrap().value, br#"{"name":"jimmy"}"#.to_vec());
        let http = message.http_extension.unwrap();
        assert_eq!(http.verb, Verb::Post as i32);
        assert_eq!(http.querystring, "");
    }

    #[tokio::test]
    async fn test_empty_typed_payload_is_none() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[])));
        let client = InvokeClient::builder(sidecar)
            .codec(CountingCodec::default())
            .api_token(NoApiToken)
            .build();

        let response = client
            .invoke_method_with_response::<Person, _>(InvocationRequest::new("people", "get"))
            .await
            .unwrap();

        assert!(response.body().is_none());
        assert_eq!(client.codec().decodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_http_extension_is_forwarded() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[("dapr-http-status", "200")])));
        let request = InvocationRequest::new("orders", "orders/42")
            .with_raw_body("hello")
            .with_http(
                HttpExtension::new(Method::PUT)
                    .query("dry_run", "true")
                    .query("a", "1")
                    .header("x-request-id", "abc-123")
                    .content_type("text/plain"),
            );

        client(sidecar.clone()).invoke_raw(request).await.unwrap();

        let (metadata, sent) = sidecar.last_call();
        assert_eq!(metadata.get("x-request-id").unwrap(), "abc-123");
        let message = sent.message.unwrap();
        assert_eq!(message.content_type, "text/plain");
        assert_eq!(message.data.unwrap().value, b"hello".to_vec());
        let http = message.http_extension.unwrap();
        assert_eq!(http.verb, Verb::Put as i32);
        assert_eq!(http.querystring, "a=1&dry_run=true");
    }

    #[tokio::test]
    async fn test_unsupported_verb() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[])));
        let request =
            InvocationRequest::new("orders", "patch").with_http(HttpExtension::new(Method::PATCH));

        let err = client(sidecar.clone()).invoke_raw(request).await.unwrap_err();
        assert!(matches!(
            err.kind(),
            InvocationErrorKind::UnsupportedOperation(_)
        ));
        assert_eq!(sidecar.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_arguments_never_reach_the_sidecar() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[])));
        let client = client(sidecar.clone());

        let err = client
            .invoke_raw(InvocationRequest::new("", "list"))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = client
            .invoke_raw(InvocationRequest::new("orders", ""))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(sidecar.call_count(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_arguments_are_forwarded() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[])));
        client(sidecar.clone())
            .invoke_raw(InvocationRequest::new(" ", " "))
            .await
            .unwrap();

        let (_, sent) = sidecar.last_call();
        assert_eq!(sent.id, " ");
        assert_eq!(sent.message.unwrap().method, " ");
    }

    #[tokio::test]
    async fn test_api_token_header() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[])));
        let with_token = InvokeClient::builder(sidecar.clone())
            .api_token(StaticApiToken::new("s3cr3t"))
            .build();
        with_token
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap();
        let (metadata, _) = sidecar.last_call();
        assert_eq!(metadata.get("dapr-api-token").unwrap(), "s3cr3t");

        client(sidecar.clone())
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap();
        let (metadata, _) = sidecar.last_call();
        assert!(metadata.get("dapr-api-token").is_none());
    }

    #[tokio::test]
    async fn test_env_api_token_is_read_on_every_call() {
        const VAR: &str = "DAPR_INVOKE_CLIENT_TEST_ROTATING_TOKEN";
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[])));
        let client = InvokeClient::builder(sidecar.clone())
            .api_token(EnvApiToken::from_var(VAR))
            .build();
        let sent_token = || {
            let (metadata, _) = sidecar.last_call();
            metadata
                .get("dapr-api-token")
                .map(|v| v.to_str().unwrap().to_string())
        };

        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(VAR, "first") };
        client
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap();
        assert_eq!(sent_token().as_deref(), Some("first"));

        unsafe { std::env::set_var(VAR, "rotated") };
        client
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap();
        assert_eq!(sent_token().as_deref(), Some("rotated"));

        unsafe { std::env::remove_var(VAR) };
        client
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap();
        assert_eq!(sent_token(), None);
    }

    #[tokio::test]
    async fn test_typed_body_uses_codec_media_type() {
        let sidecar = FakeSidecar::replying(|| Ok(reply_with(b"", &[])));
        let client = InvokeClient::builder(sidecar.clone())
            .codec(VendorJsonCodec)
            .api_token(NoApiToken)
            .build();

        client
            .invoke_raw(InvocationRequest::new("orders", "create").with_body(1u32))
            .await
            .unwrap();
        let (_, sent) = sidecar.last_call();
        assert_eq!(sent.message.unwrap().content_type, "application/vnd.orders+json");

        // Raw bodies keep the JSON default
        client
            .invoke_raw(InvocationRequest::new("orders", "create").with_raw_body("1"))
            .await
            .unwrap();
        let (_, sent) = sidecar.last_call();
        assert_eq!(sent.message.unwrap().content_type, "application/json");

        // An explicit content type wins over the codec
        let request = InvocationRequest::new("orders", "create")
            .with_body(1u32)
            .with_http(HttpExtension::new(Method::PUT).content_type("text/plain"));
        client.invoke_raw(request).await.unwrap();
        let (_, sent) = sidecar.last_call();
        assert_eq!(sent.message.unwrap().content_type, "text/plain");

        // Without a content type the extension falls back to the codec
        let request = InvocationRequest::new("orders", "create")
            .with_body(1u32)
            .with_http(HttpExtension::new(Method::PUT));
        client.invoke_raw(request).await.unwrap();
        let (_, sent) = sidecar.last_call();
        assert_eq!(sent.message.unwrap().content_type, "application/vnd.orders+json");
    }

    #[tokio::test]
    async fn test_rpc_status_message_comes_from_trailers() {
        let sidecar = FakeSidecar::replying(|| {
            let mut reply = reply_with(b"", &[]);
            reply
                .trailers
                .insert("grpc-status", MetadataValue::from_static("0"));
            reply
                .trailers
                .insert("grpc-message", MetadataValue::from_static("served from cache"));
            Ok(reply)
        });
        let response = client(sidecar)
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap();

        let status = response.rpc_status().unwrap();
        assert_eq!(status.code(), Code::Ok);
        assert_eq!(status.message(), "served from cache");
    }

    #[tokio::test]
    async fn test_failure_without_details_is_transport_error() {
        let sidecar = FakeSidecar::replying(|| Err(tonic::Status::unavailable("no sidecar")));
        let err = client(sidecar)
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), InvocationErrorKind::Transport(_)));
        assert!(err.composite_status().is_none());
        assert_eq!(err.code(), Code::Unavailable);
        assert_eq!(err.method(), "list");
    }

    #[tokio::test]
    async fn test_failure_with_error_info_is_remote_application_error() {
        let sidecar = FakeSidecar::replying(|| Err(rich_failure("429", "too many requests")));
        let err = client(sidecar)
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap_err();

        let composite = err.composite_status().unwrap();
        assert_eq!(composite.code(), Code::Unknown);
        assert_eq!(composite.message(), "invoke failed");
        assert_eq!(composite.http_code(), Some(429));
        assert_eq!(composite.http_message(), Some("too many requests"));
        assert!(err.transport_status().is_some());
    }

    #[tokio::test]
    async fn test_undecodable_details_fall_back_to_transport_error() {
        let sidecar = FakeSidecar::replying(|| {
            Err(tonic::Status::with_details(
                tonic::Code::Internal,
                "broken",
                Bytes::from_static(&[0xff, 0xff, 0xff]),
            ))
        });
        let err = client(sidecar)
            .invoke_raw(InvocationRequest::new("orders", "list"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), InvocationErrorKind::Transport(_)));
        assert_eq!(err.code(), Code::Internal);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_call() {
        let sidecar = FakeSidecar::hanging();
        let token = CancellationToken::new();
        let request = InvocationRequest::new("orders", "slow").with_cancellation(token.clone());

        let client = client(sidecar);
        let call = tokio::spawn(async move { client.invoke_raw(request).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        let err = call.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.code(), Code::Canceled);
    }

    #[tokio::test]
    async fn test_client_timeout() {
        let client = InvokeClient::builder(FakeSidecar::hanging())
            .api_token(NoApiToken)
            .timeout(Duration::from_millis(20))
            .build();

        let err = client
            .invoke_raw(InvocationRequest::new("orders", "slow"))
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), InvocationErrorKind::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_invoke_method_raw_ensures_success() {
        let sidecar = FakeSidecar::replying(|| {
            Ok(reply_with(b"server exploded", &[("dapr-http-status", "500")]))
        });
        let err = client(sidecar)
            .invoke_method_raw("orders", "list", Bytes::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err.kind(),
            InvocationErrorKind::UnsuccessfulResponse(ResponseStatus::Http(500))
        ));
    }

    #[test]
    fn test_verb_for() {
        assert_eq!(verb_for(&Method::GET).unwrap(), Verb::Get);
        assert_eq!(verb_for(&Method::TRACE).unwrap(), Verb::Trace);
        assert!(verb_for(&Method::PATCH).is_err());
        assert!(verb_for(&Method::from_bytes(b"PURGE").unwrap()).is_err());
    }

    #[test]
    fn test_parse_http_status() {
        assert_eq!(parse_http_status(b"404").unwrap(), 404);
        assert_eq!(parse_http_status(b" 200 ").unwrap(), 200);
        assert!(parse_http_status(b"abc").is_err());
        assert!(parse_http_status(b"\xff").is_err());
    }
}
