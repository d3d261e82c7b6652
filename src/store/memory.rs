use super::{Customer, Datastore, NewCustomer, NewProduct, Product, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Records {
    customers: Vec<Customer>,
    products: Vec<Product>,
}

/// Process-local datastore. Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

#[async_trait]
impl Datastore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        let records = self.records.read().await;
        Ok(records
            .customers
            .iter()
            .find(|customer| customer.email == email)
            .cloned())
    }

    async fn find_customer_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>> {
        let records = self.records.read().await;
        Ok(records
            .customers
            .iter()
            .find(|customer| customer.id == id)
            .cloned())
    }

    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Option<Customer>> {
        let mut records = self.records.write().await;
        // Same guarantee as the unique index on customers.email.
        if records
            .customers
            .iter()
            .any(|existing| existing.email == customer.email)
        {
            return Err(StoreError::Conflict);
        }

        let created = Customer {
            id: Uuid::now_v7(),
            name: customer.name,
            last_name: customer.last_name,
            email: customer.email,
            password_hash: customer.password_hash,
            role: customer.role,
            created_at: Utc::now(),
        };
        records.customers.push(created.clone());
        Ok(Some(created))
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let records = self.records.read().await;
        Ok(records.products.iter().rev().cloned().collect())
    }

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let records = self.records.read().await;
        Ok(records
            .products
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let created = Product {
            id: Uuid::now_v7(),
            name: product.name,
            description: product.description,
            price: product.price,
            discount: product.discount,
            discounted_price: product.discounted_price,
            image_url: product.image_url,
            stars: product.stars,
            created_at: Utc::now(),
        };
        self.records.write().await.products.push(created.clone());
        Ok(created)
    }
}
