//! Subscriber app behind a sidecar.
//!
//! Pub/sub deliveries arrive as `application/cloudevents+json`. The
//! `CloudEventsLayer` unwraps them, so the handlers below see a plain
//! `Order` body. The same route also accepts direct invocations.
//!
//! Run with: cargo run --bin cloudevents-server
//!
//! Test with:
//!   curl -X POST http://localhost:3000/orders \
//!     -H 'Content-Type: application/cloudevents+json' \
//!     -d '{"id":"1","source":"shop","type":"order","data":{"id":7,"item":"tea","quantity":2}}'

use axum::{Json, Router, routing::post};
use dapr_invoke_axum::{CloudEventsLayer, CloudEventsOptions};
use dapr_invoke_demos::{Order, Receipt, init_tracing};
use std::net::SocketAddr;

async fn create_order(Json(order): Json<Order>) -> Json<Receipt> {
    tracing::info!(order_id = order.id, item = %order.item, "received order");
    Json(Receipt {
        order_id: order.id,
        accepted: order.quantity > 0,
    })
}

async fn audit(body: String) -> &'static str {
    tracing::info!(len = body.len(), "audit entry");
    "ok"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let options = CloudEventsOptions::new().max_body_bytes(1024 * 1024);
    let app = Router::new()
        .route("/orders", post(create_order))
        .route("/audit", post(audit))
        .layer(CloudEventsLayer::with_options(options));

    let port: u16 = std::env::var("APP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
