//! axum integration for applications behind a Dapr sidecar.
//!
//! The sidecar delivers pub/sub messages wrapped in a structured CloudEvents
//! envelope (`application/cloudevents+json`). [`CloudEventsLayer`] unwraps
//! them so handlers receive the inner payload with its own content type, as
//! if it had been posted directly.
//!
//! ## Example
//!
//! ```rust,ignore
//! use axum::{Json, Router, routing::post};
//! use dapr_invoke_axum::{CloudEventsLayer, CloudEventsOptions};
//!
//! async fn on_order(Json(order): Json<Order>) {
//!     // `order` is the event's `data`, not the envelope
//! }
//!
//! let app = Router::new()
//!     .route("/orders", post(on_order))
//!     .layer(CloudEventsLayer::with_options(
//!         CloudEventsOptions::new().max_body_bytes(4 * 1024 * 1024),
//!     ));
//! ```
//!
//! The rewrite can also be applied by hand with [`normalize_cloud_event`].

pub mod charset;
pub mod envelope;
pub mod error;
pub mod layer;
pub mod normalize;

pub use charset::{Charset, MediaType};
pub use envelope::CloudEvent;
pub use error::EnvelopeError;
pub use layer::{CloudEventsLayer, CloudEventsService};
pub use normalize::{CloudEventsOptions, normalize_cloud_event};
