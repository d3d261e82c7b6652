//! Data access for customers and products.
//!
//! Handlers only see the [`Datastore`] trait; the DSN scheme picks the backend:
//! `postgres://` (sqlx) or `memory://` (process-local, used by tests and local runs).

mod memory;
mod postgres;

pub use self::memory::MemoryStore;
pub use self::postgres::PgStore;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use thiserror::Error;
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored customer, including the password hash. Never serialize this directly.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: Option<f64>,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub stars: f32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: Option<f64>,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub stars: f32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (customer email) rejected the write.
    #[error("record already exists")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait Datastore: Send + Sync {
    /// Backend name reported in logs.
    fn kind(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    async fn find_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>>;

    async fn find_customer_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>>;

    /// Returns `None` when the backend accepted the write but produced no record.
    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Option<Customer>>;

    /// All products, newest first.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>>;

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product>;
}

/// Open the datastore named by `dsn`.
///
/// # Errors
/// Returns an error for unknown schemes or when the database is unreachable.
pub async fn connect(dsn: &str) -> Result<Arc<dyn Datastore>> {
    let parsed = Url::parse(dsn).context("Invalid datastore DSN")?;
    match parsed.scheme() {
        "memory" => Ok(Arc::new(MemoryStore::default())),
        "postgres" | "postgresql" => Ok(Arc::new(PgStore::connect(dsn).await?)),
        other => Err(anyhow!("Unsupported datastore scheme: {other}")),
    }
}
