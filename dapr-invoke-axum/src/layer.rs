//! Tower layer that unwraps CloudEvents before they reach handlers.

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service, ServiceExt};

use crate::normalize::{CloudEventsOptions, normalize_cloud_event};

/// Layer that replaces `application/cloudevents+json` requests with their payload.
///
/// Requests that fail to unwrap are answered with `400 Bad Request` and never
/// reach the inner service.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::post};
/// use dapr_invoke_axum::CloudEventsLayer;
///
/// let app = Router::new()
///     .route("/orders", post(handler))
///     .layer(CloudEventsLayer::new());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CloudEventsLayer {
    options: CloudEventsOptions,
}

impl CloudEventsLayer {
    /// Create a new CloudEventsLayer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new CloudEventsLayer with the given options.
    pub fn with_options(options: CloudEventsOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CloudEventsOptions {
        &self.options
    }
}

impl<S> Layer<S> for CloudEventsLayer {
    type Service = CloudEventsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CloudEventsService {
            inner,
            options: self.options.clone(),
        }
    }
}

/// Service produced by [`CloudEventsLayer`].
#[derive(Debug, Clone)]
pub struct CloudEventsService<S> {
    inner: S,
    options: CloudEventsOptions,
}

impl<S> Service<Request<Body>> for CloudEventsService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness
        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);
        let options = self.options.clone();

        Box::pin(async move {
            let path = req.uri().path().to_owned();
            match normalize_cloud_event(req, &options).await {
                Ok(req) => inner.oneshot(req).await,
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "rejected cloud event");
                    Ok(err.into_response())
                }
            }
        })
    }
}
