//! Product catalogue endpoints.

use crate::{
    api::response::{ApiError, Envelope, ErrorBody},
    auth::{AuthConfig, require_admin},
    store::{Datastore, NewProduct, Product},
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

const MAX_STARS: f32 = 5.0;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Discount percentage, 0-100.
    pub discount: Option<f64>,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub stars: f32,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            discount: product.discount,
            discounted_price: product.discounted_price,
            image_url: product.image_url,
            stars: product.stars,
            created_at: product.created_at,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub discount: Option<f64>,
    pub image_url: Option<String>,
    pub stars: Option<f32>,
}

/// Price after applying a percentage discount, rounded to cents. Set whenever
/// a discount is present, so a 0% discount yields the list price.
pub(crate) fn discounted_price(price: f64, discount: Option<f64>) -> Option<f64> {
    discount.map(|d| (price * (1.0 - d / 100.0) * 100.0).round() / 100.0)
}

fn validate(request: &ProductCreate) -> Result<(), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Invalid name"));
    }
    if !request.price.is_finite() || request.price < 0.0 {
        return Err(ApiError::bad_request("Invalid price"));
    }
    if let Some(discount) = request.discount {
        if !(0.0..=100.0).contains(&discount) {
            return Err(ApiError::bad_request("Invalid discount"));
        }
    }
    if let Some(stars) = request.stars {
        if !(0.0..=MAX_STARS).contains(&stars) {
            return Err(ApiError::bad_request("Invalid stars"));
        }
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/product/",
    responses(
        (status = 200, description = "All products, newest first", body = Envelope<Vec<ProductResponse>>),
        (status = 500, description = "Datastore failure", body = ErrorBody),
    ),
    tag = "product"
)]
#[instrument(skip(store))]
pub async fn list_products(
    store: Extension<Arc<dyn Datastore>>,
) -> Result<Json<Envelope<Vec<ProductResponse>>>, ApiError> {
    let products = store.list_products().await?;
    let payload: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(Json(Envelope::new("Products found", payload)))
}

#[utoipa::path(
    get,
    path = "/api/product/{id}",
    params(
        ("id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product detail", body = Envelope<ProductResponse>),
        (status = 400, description = "Invalid product id", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    tag = "product"
)]
#[instrument(skip(store))]
pub async fn get_product(
    Path(id): Path<String>,
    store: Extension<Arc<dyn Datastore>>,
) -> Result<Json<Envelope<ProductResponse>>, ApiError> {
    let Ok(product_id) = Uuid::parse_str(id.trim()) else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid product id",
            "INVALID_ID",
        ));
    };

    match store.find_product(product_id).await? {
        Some(product) => Ok(Json(Envelope::new(
            "Product found",
            ProductResponse::from(product),
        ))),
        None => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "Product not found",
            "PRODUCT_NOT_FOUND",
        )),
    }
}

#[utoipa::path(
    post,
    path = "/api/product/",
    request_body = ProductCreate,
    responses(
        (status = 201, description = "Product created", body = Envelope<ProductResponse>),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "product"
)]
#[instrument(skip(headers, store, auth_config, payload))]
pub async fn create_product(
    headers: HeaderMap,
    store: Extension<Arc<dyn Datastore>>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<ProductCreate>>,
) -> Result<(StatusCode, Json<Envelope<ProductResponse>>), ApiError> {
    let principal = require_admin(&headers, &auth_config)?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::bad_request("Missing payload"));
    };
    validate(&request)?;

    let product = store
        .create_product(NewProduct {
            name: request.name.trim().to_string(),
            description: request.description,
            price: request.price,
            discount: request.discount,
            discounted_price: discounted_price(request.price, request.discount),
            image_url: request.image_url.filter(|url| !url.trim().is_empty()),
            stars: request.stars.unwrap_or(0.0),
        })
        .await?;

    info!(product_id = %product.id, admin_id = %principal.customer_id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("Product created", ProductResponse::from(product))),
    ))
}
