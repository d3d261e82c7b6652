use super::{
    Customer, Datastore, NewCustomer, NewProduct, Product, Role, StoreError, StoreResult,
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use sqlx::{
    Connection, PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use std::time::Duration;
use tracing::{Instrument, info_span};
use uuid::Uuid;

const CUSTOMER_COLUMNS: &str = "id, name, last_name, email, password_hash, role, created_at";
const PRODUCT_COLUMNS: &str =
    "id, name, description, price, discount, discounted_price, image_url, stars, created_at";

/// Postgres-backed datastore, schema in `sql/schema.sql`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a small pool to `dsn`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be reached.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_span(operation: &'static str, statement: &str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn customer_from_row(row: &PgRow) -> Result<Customer> {
    let role: String = row.try_get("role")?;
    Ok(Customer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: Role::parse(&role).ok_or_else(|| anyhow!("unknown customer role: {role}"))?,
        created_at: row.try_get("created_at")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        discount: row.try_get("discount")?,
        discounted_price: row.try_get("discounted_price")?,
        image_url: row.try_get("image_url")?,
        stars: row.try_get("stars")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Datastore for PgStore {
    fn kind(&self) -> &'static str {
        "postgresql"
    }

    async fn ping(&self) -> StoreResult<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")?;

        Ok(())
    }

    async fn find_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to lookup customer by email")?;

        Ok(row.as_ref().map(customer_from_row).transpose()?)
    }

    async fn find_customer_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to lookup customer by id")?;

        Ok(row.as_ref().map(customer_from_row).transpose()?)
    }

    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Option<Customer>> {
        let query = format!(
            "INSERT INTO customers (id, name, last_name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CUSTOMER_COLUMNS}"
        );
        let result = sqlx::query(&query)
            .bind(Uuid::now_v7())
            .bind(&customer.name)
            .bind(&customer.last_name)
            .bind(&customer.email)
            .bind(&customer.password_hash)
            .bind(customer.role.as_str())
            .fetch_optional(&self.pool)
            .instrument(db_span("INSERT", &query))
            .await;

        match result {
            Ok(row) => Ok(row.as_ref().map(customer_from_row).transpose()?),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to insert customer")
                .into()),
        }
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let query =
            format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to list products")?;

        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>>>()?)
    }

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to lookup product")?;

        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let query = format!(
            "INSERT INTO products \
             (id, name, description, price, discount, discounted_price, image_url, stars) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::now_v7())
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.discount)
            .bind(product.discounted_price)
            .bind(&product.image_url)
            .bind(product.stars)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", &query))
            .await
            .context("failed to insert product")?;

        Ok(product_from_row(&row)?)
    }
}
