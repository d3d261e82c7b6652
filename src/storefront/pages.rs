//! Storefront page handlers.

use super::{
    client::{ApiClient, FetchError},
    offers::{self, ProductCard},
    suspense,
    views::{ErrorPageTemplate, HomeShellTemplate, ProductPageTemplate, render_html, render_response},
};
use crate::GIT_COMMIT_HASH;
use axum::{
    Json,
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, instrument};

/// DOM id of the special offers slot.
pub const OFFERS_BOUNDARY: &str = "special-offers";

/// Home page. The shell and skeletons are flushed immediately; the offers
/// section follows once the API answers.
#[instrument(skip(client))]
pub async fn home(client: Extension<Arc<ApiClient>>) -> Response {
    let shell = match render_html(&HomeShellTemplate::new(OFFERS_BOUNDARY)) {
        Ok(shell) => shell,
        Err(err) => {
            error!("Failed to render home shell: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed").into_response();
        }
    };

    let Extension(client) = client;
    let deferred = async move { offers::render_special_offers(&client).await };

    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        suspense::body(shell, OFFERS_BOUNDARY, deferred),
    )
        .into_response()
}

#[instrument(skip(client))]
pub async fn product(
    Path(id): Path<String>,
    client: Extension<Arc<ApiClient>>,
) -> Response {
    match client.product_by_id(&id).await {
        Ok(product) => render_response(
            &ProductPageTemplate::new(ProductCard::from(&product)),
            StatusCode::OK,
        ),
        Err(FetchError::NotFound) => {
            render_response(&ErrorPageTemplate::not_found(), StatusCode::NOT_FOUND)
        }
        Err(err) => {
            error!("Error fetching product {id}: {err}");
            render_response(&ErrorPageTemplate::upstream(), StatusCode::BAD_GATEWAY)
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "commit": GIT_COMMIT_HASH,
    }))
}
