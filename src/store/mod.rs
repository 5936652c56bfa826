use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::health::HealthCheck;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

// ============================================================================
// Repositories - Persistence ports for the aggregates
// ============================================================================
//
// The only cross-request consistency mechanism is the store itself: the
// order reference is unique at this layer and a violation is reported as
// `StoreError::UniqueViolation`. Deleting an order deletes its lines.
//
// ============================================================================

/// Name of the unique index guarding `Order.reference`.
pub const ORDER_REFERENCE_INDEX: &str = "ix_orders_reference";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order together with its lines.
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    /// All orders with their lines, oldest first.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Overwrite the stored lines of an existing order.
    /// Returns `false` when the order does not exist.
    async fn update_order(&self, order: &Order) -> Result<bool, StoreError>;

    /// Remove an order and its lines. Returns `false` when nothing was removed.
    async fn delete_order(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

/// The storage backend as seen by the services and the health endpoint.
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrderRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: OrderRepository + ProductRepository + HealthCheck + 'static,
    {
        Self {
            orders: store.clone(),
            products: store.clone(),
            health: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    /// Connect to PostgreSQL and make sure the schema exists.
    pub async fn postgres(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let store = PostgresStore::connect(config).await?;
        store.ensure_schema().await?;
        Ok(Self::from_store(Arc::new(store)))
    }
}
