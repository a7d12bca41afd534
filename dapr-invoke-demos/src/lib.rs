//! Shared types for the demo binaries.

use serde::{Deserialize, Serialize};

/// App id the subscriber runs under.
pub const ORDERS_APP_ID: &str = "order-processor";

/// An order, published as CloudEvent `data` and sent as an invocation body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u32,
    pub item: String,
    pub quantity: u32,
}

/// Acknowledgement returned by the subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub order_id: u32,
    pub accepted: bool,
}

/// Sidecar gRPC endpoint from `DAPR_GRPC_ENDPOINT`, then `DAPR_GRPC_PORT`.
pub fn sidecar_endpoint() -> String {
    if let Ok(endpoint) = std::env::var("DAPR_GRPC_ENDPOINT") {
        return endpoint;
    }
    let port = std::env::var("DAPR_GRPC_PORT").unwrap_or_else(|_| "50001".to_string());
    format!("http://127.0.0.1:{}", port)
}

/// Install a `tracing` subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dapr_invoke_client=debug,dapr_invoke_axum=debug".into()),
        )
        .init();
}
