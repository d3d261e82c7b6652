//! Server-rendered storefront.
//!
//! Reads the catalogue through [`ApiClient`] and renders HTML with askama. The
//! home page is streamed: loading skeletons first, special offers when ready.

mod client;
pub mod offers;
mod pages;
pub mod suspense;
pub mod views;

pub use self::client::{ApiClient, FetchError, PRODUCT_ERROR, PRODUCTS_ERROR, Product};
pub use self::pages::OFFERS_BOUNDARY;

use crate::api::{make_span, shutdown_signal};
use anyhow::Result;
use axum::{
    Extension, Router,
    http::{HeaderName, HeaderValue},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::info;
use ulid::Ulid;

/// Storefront routes and middleware.
#[must_use]
pub fn app(client: ApiClient) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/product/:id", get(pages::product))
        .route("/health", get(pages::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(Arc::new(client))),
        )
}

/// Start the storefront
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, client: ApiClient) -> Result<()> {
    info!(
        "Reading products from {} (fetch delay {:?})",
        client.base_url(),
        client.fetch_delay()
    );

    let app = app(client);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
