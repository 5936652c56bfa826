use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use super::{OrderRepository, ProductRepository, StoreError};
use crate::config::DatabaseConfig;
use crate::domain::order::{Order, OrderLine};
use crate::domain::product::Product;
use crate::health::{HealthCheck, HealthStatus};

// ============================================================================
// PostgreSQL Store
// ============================================================================
//
// Tables:
// - products     (id, name, price)
// - orders       (id, reference)        unique index on reference
// - order_lines  (id, order_id, product_id, quantity)
//
// Every multi-statement write runs in a single transaction. Order lines are
// deleted explicitly before their order; there is no ON DELETE CASCADE.
//
// ============================================================================

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        price NUMERIC NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        reference TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS ix_orders_reference ON orders (reference)",
    "CREATE TABLE IF NOT EXISTS order_lines (
        id UUID PRIMARY KEY,
        order_id UUID NOT NULL REFERENCES orders (id),
        product_id UUID NOT NULL,
        quantity INTEGER NOT NULL
    )",
];

pub struct PostgresStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    reference: String,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: BigDecimal,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::restore(row.id, row.name, row.price)
    }
}

/// Attach lines to their orders, preserving the order of both inputs.
fn assemble_orders(orders: Vec<OrderRow>, lines: Vec<OrderLineRow>) -> Vec<Order> {
    let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLine::restore(line.id, line.order_id, line.product_id, line.quantity));
    }

    orders
        .into_iter()
        .map(|row| {
            let lines = lines_by_order.remove(&row.id).unwrap_or_default();
            Order::restore(row.id, row.reference, lines)
        })
        .collect()
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        tracing::info!(
            max_connections = config.max_connections,
            connect_timeout_secs = config.connect_timeout.as_secs(),
            "Connecting to PostgreSQL..."
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(&config.url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes when they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("✅ Database schema ready");
        Ok(())
    }

    async fn insert_lines(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), StoreError> {
        for line in order.lines() {
            sqlx::query(
                "INSERT INTO order_lines (id, order_id, product_id, quantity) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(line.id())
            .bind(line.order_id())
            .bind(line.product_id())
            .bind(line.quantity())
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO orders (id, reference) VALUES ($1, $2)")
            .bind(order.id())
            .bind(order.reference())
            .execute(&mut *tx)
            .await?;
        Self::insert_lines(&mut tx, order).await?;

        tx.commit().await?;

        tracing::debug!(
            order_id = %order.id(),
            line_count = order.lines().len(),
            "Inserted order"
        );
        Ok(())
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> =
            sqlx::query_as("SELECT id, reference FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, product_id, quantity FROM order_lines \
             WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble_orders(vec![row], lines).pop())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let orders = sqlx::query_as::<_, OrderRow>("SELECT id, reference FROM orders ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let lines = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, product_id, quantity FROM order_lines ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble_orders(orders, lines))
    }

    async fn update_order(&self, order: &Order) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE orders SET reference = $2 WHERE id = $1")
            .bind(order.id())
            .bind(order.reference())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(order.id())
            .execute(&mut *tx)
            .await?;
        Self::insert_lines(&mut tx, order).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let removed_lines = sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let removed = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::debug!(order_id = %id, removed_lines, "Deleted order");
        Ok(removed > 0)
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO products (id, name, price) VALUES ($1, $2, $3)")
            .bind(product.id())
            .bind(product.name())
            .bind(product.price())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> =
            sqlx::query_as("SELECT id, name, price FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Product::from))
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as("SELECT id, name, price FROM products ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl HealthCheck for PostgresStore {
    fn component_name(&self) -> &str {
        "database"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["Database"]
    }

    async fn check_health(&self) -> HealthStatus {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => {
                tracing::error!(error = %e, "Database health probe failed");
                HealthStatus::Unhealthy("Unable to connect the database.".to_string())
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Queries need a live PostgreSQL instance; only the row assembly is covered
// here.
//
// ============================================================================
