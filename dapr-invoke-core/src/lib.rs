//! Core types for invoking applications through a Dapr sidecar.
//!
//! This crate provides shared types and functions used by both the client
//! (`dapr-invoke-client`) and the axum layer (`dapr-invoke-axum`).
//!
//! ## Modules
//!
//! - `error`: gRPC status codes and codec errors
//! - `codec`: Payload codec trait and the JSON implementation
//! - `status`: Composite status and the rich error detail decoder
//! - `names`: Well-known header, metadata and media type names

mod codec;
mod error;
mod names;
mod status;

pub use codec::*;
pub use error::*;
pub use names::*;
pub use status::*;
