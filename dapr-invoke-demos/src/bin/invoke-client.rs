//! Caller app behind a sidecar.
//!
//! Invokes the `order-processor` app through the local sidecar and prints
//! how each call was resolved.
//!
//! Usage:
//!   # Start the subscriber under a sidecar first:
//!   dapr run --app-id order-processor --app-port 3000 -- cargo run --bin cloudevents-server
//!
//!   # Then run the caller under its own sidecar:
//!   dapr run --app-id checkout -- cargo run --bin invoke-client

use std::time::Duration;

use dapr_invoke_client::{
    CancellationToken, GrpcTransport, HttpExtension, InvocationRequest, InvokeClient,
    ResponseStatus,
};
use dapr_invoke_demos::{ORDERS_APP_ID, Order, Receipt, init_tracing, sidecar_endpoint};
use http::Method;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let endpoint = sidecar_endpoint();
    tracing::info!("using sidecar at {}", endpoint);

    let transport = GrpcTransport::connect(endpoint).await?;
    let client = InvokeClient::builder(transport)
        .timeout(Duration::from_secs(5))
        .build();

    // Typed in, typed out
    let order = Order {
        id: 1,
        item: "tea".to_string(),
        quantity: 2,
    };
    let receipt: Option<Receipt> = client.invoke_method(ORDERS_APP_ID, "orders", &order).await?;
    println!("receipt: {:?}", receipt);

    // Full response with an HTTP extension
    let request = InvocationRequest::new(ORDERS_APP_ID, "audit")
        .with_raw_body("checkout started")
        .with_http(
            HttpExtension::new(Method::POST)
                .query("source", "checkout")
                .content_type("text/plain"),
        );
    let response = client.invoke_raw(request).await?;
    match response.status() {
        ResponseStatus::Http(code) => println!("audit answered HTTP {}", code),
        ResponseStatus::Rpc(status) => println!("audit answered {}", status),
    }

    // A method that does not exist: inspect the decoded error
    let token = CancellationToken::new();
    let request = InvocationRequest::new(ORDERS_APP_ID, "missing")
        .with_http(HttpExtension::new(Method::GET))
        .with_cancellation(token);
    match client.invoke_raw(request).await {
        Ok(response) => println!("missing answered {}", response.status()),
        Err(err) => match err.composite_status() {
            Some(status) => println!("missing failed: {}", status),
            None => println!("missing failed: {}", err),
        },
    }

    Ok(())
}
