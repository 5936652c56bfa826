use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OrderRepository, ProductRepository, StoreError, ORDER_REFERENCE_INDEX};
use crate::domain::order::{Order, OrderLine};
use crate::domain::product::Product;
use crate::health::{HealthCheck, HealthStatus};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Mirrors the relational layout: orders and order lines live in separate
// tables, the reference index is maintained alongside the orders table and
// deleting an order deletes its lines explicitly.
//
// Keys are UUID v7, so BTreeMap iteration order is creation order.
//
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    orders: BTreeMap<Uuid, String>,
    references: HashMap<String, Uuid>,
    order_lines: BTreeMap<Uuid, OrderLine>,
    products: BTreeMap<Uuid, Product>,
}

impl Tables {
    fn lines_of(&self, order_id: Uuid) -> Vec<OrderLine> {
        self.order_lines
            .values()
            .filter(|line| line.order_id() == order_id)
            .cloned()
            .collect()
    }

    fn load(&self, order_id: Uuid) -> Option<Order> {
        self.orders
            .get(&order_id)
            .map(|reference| Order::restore(order_id, reference.clone(), self.lines_of(order_id)))
    }

    fn remove_lines_of(&mut self, order_id: Uuid) {
        self.order_lines.retain(|_, line| line.order_id() != order_id);
    }

    fn insert_lines(&mut self, order: &Order) {
        for line in order.lines() {
            self.order_lines.insert(line.id(), line.clone());
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored order lines across all orders.
    pub async fn order_line_count(&self) -> usize {
        self.state.read().await.order_lines.len()
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut tables = self.state.write().await;

        if tables.orders.contains_key(&order.id()) {
            return Err(StoreError::UniqueViolation {
                constraint: "orders_pkey".to_string(),
            });
        }
        if tables.references.contains_key(order.reference()) {
            return Err(StoreError::UniqueViolation {
                constraint: ORDER_REFERENCE_INDEX.to_string(),
            });
        }

        tables.orders.insert(order.id(), order.reference().to_string());
        tables
            .references
            .insert(order.reference().to_string(), order.id());
        tables.insert_lines(order);

        Ok(())
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.state.read().await.load(id))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let tables = self.state.read().await;
        Ok(tables
            .orders
            .keys()
            .filter_map(|id| tables.load(*id))
            .collect())
    }

    async fn update_order(&self, order: &Order) -> Result<bool, StoreError> {
        let mut tables = self.state.write().await;

        if !tables.orders.contains_key(&order.id()) {
            return Ok(false);
        }

        tables.remove_lines_of(order.id());
        tables.insert_lines(order);
        Ok(true)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.state.write().await;

        let Some(reference) = tables.orders.remove(&id) else {
            return Ok(false);
        };
        tables.references.remove(&reference);
        tables.remove_lines_of(id);
        Ok(true)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut tables = self.state.write().await;

        if tables.products.contains_key(&product.id()) {
            return Err(StoreError::UniqueViolation {
                constraint: "products_pkey".to_string(),
            });
        }
        tables.products.insert(product.id(), product.clone());
        Ok(())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    fn component_name(&self) -> &str {
        "database"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["Database", "InMemory"]
    }

    async fn check_health(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}
