//! Invocation request types.
//!
//! An [`InvocationRequest`] names the target application and method, carries
//! an optional body and an optional [`HttpExtension`], and owns the
//! cancellation token for the call.
//!
//! # Example
//!
//! ```ignore
//! use dapr_invoke_client::{HttpExtension, InvocationRequest};
//! use http::Method;
//!
//! let request = InvocationRequest::new("orders", "orders/42")
//!     .with_body(order)
//!     .with_http(
//!         HttpExtension::new(Method::PUT)
//!             .query("dry_run", "true")
//!             .header("x-request-id", "abc-123"),
//!     );
//! ```

use std::collections::BTreeMap;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use tokio_util::sync::CancellationToken;

/// Request payload: a value for the codec, or bytes sent verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody<B> {
    Typed(B),
    Raw(Bytes),
}

/// HTTP shape of the call, for callees served over HTTP by the sidecar.
#[derive(Debug, Clone)]
pub struct HttpExtension {
    verb: Method,
    query: BTreeMap<String, String>,
    headers: HeaderMap,
    content_type: Option<String>,
}

impl HttpExtension {
    /// Create an extension with the given verb.
    pub fn new(verb: Method) -> Self {
        Self {
            verb,
            query: BTreeMap::new(),
            headers: HeaderMap::new(),
            content_type: None,
        }
    }

    /// Add a query string parameter.
    pub fn query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Debug,
    {
        let name = name.try_into().expect("invalid header name");
        let value = value.try_into().expect("invalid header value");
        self.headers.insert(name, value);
        self
    }

    /// Try to add a header.
    ///
    /// Returns `None` if the header name or value is invalid.
    pub fn try_header<K, V>(mut self, name: K, value: V) -> Option<Self>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        let name = name.try_into().ok()?;
        let value = value.try_into().ok()?;
        self.headers.insert(name, value);
        Some(self)
    }

    /// Set the content type of the request body.
    pub fn content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn verb(&self) -> &Method {
        &self.verb
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn get_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// A single service invocation.
#[derive(Debug, Clone)]
pub struct InvocationRequest<B = ()> {
    app_id: String,
    method: String,
    body: Option<RequestBody<B>>,
    http: Option<HttpExtension>,
    cancellation: CancellationToken,
}

impl InvocationRequest<()> {
    /// Create a request without a body.
    pub fn new<A: Into<String>, M: Into<String>>(app_id: A, method: M) -> Self {
        Self {
            app_id: app_id.into(),
            method: method.into(),
            body: None,
            http: None,
            cancellation: CancellationToken::new(),
        }
    }
}

impl<B> InvocationRequest<B> {
    /// Attach a typed body, encoded by the client's codec.
    pub fn with_body<T>(self, body: T) -> InvocationRequest<T> {
        InvocationRequest {
            app_id: self.app_id,
            method: self.method,
            body: Some(RequestBody::Typed(body)),
            http: self.http,
            cancellation: self.cancellation,
        }
    }

    /// Attach a raw body, sent without encoding.
    pub fn with_raw_body<T: Into<Bytes>>(mut self, body: T) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    /// Attach an HTTP extension.
    pub fn with_http(mut self, http: HttpExtension) -> Self {
        self.http = Some(http);
        self
    }

    /// Use `token` to cancel the call.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn body(&self) -> Option<&RequestBody<B>> {
        self.body.as_ref()
    }

    pub fn http(&self) -> Option<&HttpExtension> {
        self.http.as_ref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}
