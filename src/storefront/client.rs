//! HTTP client for the product API.

use crate::{APP_USER_AGENT, api::response::Envelope};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub const PRODUCTS_ERROR: &str = "Error al obtener los productos";
pub const PRODUCT_ERROR: &str = "Error al obtener el producto";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Product as the storefront consumes it. Unknown fields are ignored and
/// optional ones default so older API payloads still render.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub discounted_price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stars: f32,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{context}")]
    Transport {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{context}")]
    Status {
        context: &'static str,
        status: StatusCode,
    },
    #[error("Producto no encontrado")]
    NotFound,
    #[error("API base URL cannot hold a path: {0}")]
    InvalidBaseUrl(Url),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    fetch_delay: Duration,
}

impl ApiClient {
    /// Build a client for the API at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            fetch_delay: Duration::ZERO,
        })
    }

    /// Artificial latency applied before every fetch, to exercise the loading states.
    #[must_use]
    pub fn with_fetch_delay(mut self, fetch_delay: Duration) -> Self {
        self.fetch_delay = fetch_delay;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn fetch_delay(&self) -> Duration {
        self.fetch_delay
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn simulate_latency(&self) {
        if !self.fetch_delay.is_zero() {
            debug!("delaying fetch by {:?}", self.fetch_delay);
            tokio::time::sleep(self.fetch_delay).await;
        }
    }

    /// `GET /api/product/`, returning the envelope payload.
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx responses or undecodable bodies.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        self.simulate_latency().await;

        let url = self.endpoint(&["api", "product", ""])?;
        let transport = |source| FetchError::Transport {
            context: PRODUCTS_ERROR,
            source,
        };

        let response = self.http.get(url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                context: PRODUCTS_ERROR,
                status: response.status(),
            });
        }

        let envelope: Envelope<Vec<Product>> = response.json().await.map_err(transport)?;
        Ok(envelope.payload)
    }

    /// `GET /api/product/{id}`.
    ///
    /// # Errors
    /// [`FetchError::NotFound`] on 404, and on 400 for ids the API cannot parse;
    /// otherwise as [`Self::fetch_products`].
    #[instrument(skip(self))]
    pub async fn product_by_id(&self, id: &str) -> Result<Product, FetchError> {
        self.simulate_latency().await;

        let url = self.endpoint(&["api", "product", id])?;
        let transport = |source| FetchError::Transport {
            context: PRODUCT_ERROR,
            source,
        };

        let response = self.http.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if matches!(status, StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                context: PRODUCT_ERROR,
                status,
            });
        }

        let envelope: Envelope<Product> = response.json().await.map_err(transport)?;
        Ok(envelope.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> Result<ApiClient> {
        ApiClient::new(Url::parse(base)?)
    }

    #[test]
    fn endpoint_appends_segments() -> Result<()> {
        let api = client("http://localhost:8081")?;
        assert_eq!(
            api.endpoint(&["api", "product", ""])?.as_str(),
            "http://localhost:8081/api/product/"
        );

        let nested = client("https://shop.example/backend/")?;
        assert_eq!(
            nested.endpoint(&["api", "product", "abc"])?.as_str(),
            "https://shop.example/backend/api/product/abc"
        );
        Ok(())
    }

    #[test]
    fn endpoint_escapes_ids() -> Result<()> {
        let api = client("http://localhost:8081")?;
        let url = api.endpoint(&["api", "product", "../customer/me"])?;
        assert_eq!(url.path(), "/api/product/..%2Fcustomer%2Fme");
        Ok(())
    }

    #[test]
    fn endpoint_rejects_opaque_base() -> Result<()> {
        let api = client("mailto:ana@example.com")?;
        assert!(matches!(
            api.endpoint(&["api"]),
            Err(FetchError::InvalidBaseUrl(_))
        ));
        Ok(())
    }

    #[test]
    fn product_deserializes_with_defaults() -> Result<()> {
        let product: Product =
            serde_json::from_str(r#"{"id":"p1","name":"Mate","price":10.5,"extra":true}"#)?;
        assert_eq!(product.description, "");
        assert_eq!(product.discount, None);
        assert!(product.image_url.is_none());
        assert!(product.stars.abs() < f32::EPSILON);
        Ok(())
    }

    #[test]
    fn fetch_delay_defaults_to_zero() -> Result<()> {
        let api = client("http://localhost:8081")?;
        assert!(api.fetch_delay().is_zero());
        let api = api.with_fetch_delay(Duration::from_millis(250));
        assert_eq!(api.fetch_delay(), Duration::from_millis(250));
        Ok(())
    }

    #[test]
    fn errors_display_user_message() {
        let err = FetchError::Status {
            context: PRODUCTS_ERROR,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(err.to_string(), "Error al obtener los productos");
    }
}
