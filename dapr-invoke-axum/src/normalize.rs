//! Rewriting a CloudEvents request into its inner payload.
//!
//! A request whose content type is exactly `application/cloudevents+json`
//! (parameters ignored) is buffered, decoded, and replaced by the event's
//! payload with the event's `datacontenttype`. Anything else, including
//! `application/cloudevents-batch+json`, passes through untouched.

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Request};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use dapr_invoke_core::{CLOUD_EVENTS_MEDIA_TYPE, JSON_MEDIA_TYPE};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::Value;

use crate::charset::{Charset, MediaType};
use crate::envelope::CloudEvent;
use crate::error::EnvelopeError;

/// Options for unwrapping CloudEvents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudEventsOptions {
    /// Keep string `data` JSON-encoded (quoted) even when `datacontenttype`
    /// is not JSON. By default such strings are written as raw text.
    pub suppress_json_decoding_of_text_payloads: bool,
    /// Maximum envelope size in bytes. `None` means unlimited.
    pub max_body_bytes: Option<usize>,
}

impl CloudEventsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suppress_json_decoding_of_text_payloads(mut self, suppress: bool) -> Self {
        self.suppress_json_decoding_of_text_payloads = suppress;
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }
}

/// Replace a CloudEvents envelope with its payload.
///
/// Returns the request unmodified when it is not a structured CloudEvent.
/// On success the `Content-Type` header is the event's `datacontenttype`
/// without its charset parameter (or `application/json`), and the stale
/// `Content-Length` is removed.
///
/// If the event has neither `data`, `data_base64` nor `datacontenttype`,
/// the body becomes the event `id` as plain text.
///
/// # Errors
///
/// Fails if the body cannot be read or decoded, is not a valid envelope,
/// carries both `data` and `data_base64`, or exceeds
/// [`CloudEventsOptions::max_body_bytes`].
pub async fn normalize_cloud_event(
    req: Request<Body>,
    options: &CloudEventsOptions,
) -> Result<Request<Body>, EnvelopeError> {
    let Some(charset) = envelope_charset(req.headers()) else {
        return Ok(req);
    };

    let (mut parts, body) = req.into_parts();
    let bytes = read_body(body, &parts.headers, options.max_body_bytes).await?;
    let text = charset
        .decode(&bytes)
        .map_err(|charset| EnvelopeError::InvalidEncoding { charset })?;
    let event = CloudEvent::from_json(&text)?;

    let (content_type, body) = unwrap_event(&event, options)?;
    let header = HeaderValue::from_str(&content_type)
        .map_err(|_| EnvelopeError::InvalidHeader(content_type.clone()))?;

    tracing::debug!(
        event_id = event.id().unwrap_or_default(),
        content_type = %content_type,
        len = body.len(),
        "unwrapped cloud event"
    );

    parts.headers.insert(CONTENT_TYPE, header);
    parts.headers.remove(CONTENT_LENGTH);
    Ok(Request::from_parts(parts, Body::from(body)))
}

/// Charset to read the envelope with, or `None` if this is not an envelope.
fn envelope_charset(headers: &HeaderMap) -> Option<Charset> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let media = MediaType::parse(value);
    media
        .is(CLOUD_EVENTS_MEDIA_TYPE)
        .then(|| media.charset().unwrap_or_default())
}

async fn read_body(
    body: Body,
    headers: &HeaderMap,
    limit: Option<usize>,
) -> Result<Bytes, EnvelopeError> {
    let Some(limit) = limit else {
        return body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| EnvelopeError::Body(Box::new(e)));
    };

    if content_length(headers).is_some_and(|len| len > limit) {
        return Err(EnvelopeError::TooLarge { limit });
    }

    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(EnvelopeError::TooLarge { limit }),
        Err(e) => Err(EnvelopeError::Body(e)),
    }
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

/// New content type and body for an event.
fn unwrap_event(
    event: &CloudEvent,
    options: &CloudEventsOptions,
) -> Result<(String, Bytes), EnvelopeError> {
    let media = event.data_content_type().map(MediaType::parse);
    let content_type = media
        .as_ref()
        .map_or_else(|| JSON_MEDIA_TYPE.to_string(), MediaType::without_charset);
    let is_json = media.as_ref().is_none_or(MediaType::is_json);

    let body = if let Some(data) = event.data() {
        match data {
            Value::String(text) if !is_json && !options.suppress_json_decoding_of_text_payloads => {
                Bytes::from(text.clone())
            }
            other => Bytes::from(serde_json::to_vec(other)?),
        }
    } else if let Some(encoded) = event.data_base64() {
        Bytes::from(STANDARD.decode(encoded)?)
    } else if media.is_none() {
        Bytes::from(event.id().unwrap_or_default().to_string())
    } else {
        Bytes::new()
    };

    Ok((content_type, body))
}
