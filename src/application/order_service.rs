use std::sync::Arc;
use uuid::Uuid;

use super::dto::{CreateOrderDto, OrderDto};
use super::errors::{codes, ServiceError};
use crate::domain::order::{LineItem, Order};
use crate::metrics::Metrics;
use crate::store::{OrderRepository, StoreError};

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: DTO → Aggregate → Repository → DTO
//
// Reference uniqueness is left to the store; a unique violation on insert is
// translated into `OrderWithSameReferenceAlreadyExists`.
//
// ============================================================================

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, metrics: Arc<Metrics>) -> Self {
        Self { orders, metrics }
    }

    pub async fn create_order(&self, request: CreateOrderDto) -> Result<OrderDto, ServiceError> {
        let order = Order::create(request.reference, request.order_lines)?;

        match self.orders.insert_order(&order).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation { constraint }) => {
                self.metrics.order_reference_conflicts_total.inc();
                tracing::warn!(
                    reference = %order.reference(),
                    constraint = %constraint,
                    "An order with the same reference already exists"
                );
                return Err(ServiceError::Conflict(
                    codes::ORDER_WITH_SAME_REFERENCE_ALREADY_EXISTS,
                ));
            }
            Err(e) => return Err(e.into()),
        }

        self.metrics.orders_created_total.inc();
        tracing::info!(
            order_id = %order.id(),
            reference = %order.reference(),
            line_count = order.lines().len(),
            "✅ Order created"
        );

        Ok(OrderDto::from(&order))
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderDto, ServiceError> {
        let order = self.load(id).await?;
        Ok(OrderDto::from(&order))
    }

    /// All orders with their lines. No pagination.
    pub async fn list_orders(&self) -> Result<Vec<OrderDto>, ServiceError> {
        let orders = self.orders.list_orders().await?;
        tracing::debug!(count = orders.len(), "Listed orders");
        Ok(orders.iter().map(OrderDto::from).collect())
    }

    /// Replace the lines of an existing order with `lines`.
    pub async fn update_order(
        &self,
        id: Uuid,
        lines: Vec<LineItem>,
    ) -> Result<OrderDto, ServiceError> {
        let mut order = self.load(id).await?;
        order.replace_lines(lines)?;

        if !self.orders.update_order(&order).await? {
            // Deleted between load and save
            return Err(self.not_found(id));
        }

        tracing::info!(
            order_id = %order.id(),
            line_count = order.lines().len(),
            "Order lines replaced"
        );
        Ok(OrderDto::from(&order))
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.orders.delete_order(id).await? {
            return Err(self.not_found(id));
        }

        self.metrics.orders_deleted_total.inc();
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Order, ServiceError> {
        self.orders
            .find_order(id)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    fn not_found(&self, id: Uuid) -> ServiceError {
        tracing::warn!(order_id = %id, "Unable to find order");
        ServiceError::NotFound(codes::ORDER_NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> (OrderService, Arc<MemoryStore>, Arc<Metrics>) {
        let store = Arc::new(MemoryStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        (OrderService::new(store.clone(), metrics.clone()), store, metrics)
    }

    fn request(reference: &str, quantities: &[i32]) -> CreateOrderDto {
        CreateOrderDto {
            reference: reference.to_string(),
            order_lines: quantities
                .iter()
                .map(|q| LineItem::new(Uuid::new_v4(), *q))
                .collect(),
        }
    }

    fn code_of(err: &ServiceError) -> Option<&'static str> {
        err.code()
    }

    #[tokio::test]
    async fn test_create_order_returns_persisted_order() {
        let (service, _, metrics) = service();
        let req = request("R1", &[2]);

        let created = service.create_order(req.clone()).await.unwrap();

        assert_eq!(created.reference, "R1");
        assert_eq!(created.order_lines, req.order_lines);
        assert_eq!(service.get_order(created.id).await.unwrap(), created);
        assert_eq!(metrics.orders_created_total.get(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_reference_conflicts_regardless_of_lines() {
        let (service, _, metrics) = service();
        service.create_order(request("R1", &[2])).await.unwrap();

        for lines in [&[2][..], &[][..], &[7, 8, 9][..]] {
            let err = service.create_order(request("R1", lines)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Conflict(_)));
            assert_eq!(code_of(&err), Some("OrderWithSameReferenceAlreadyExists"));
        }

        assert_eq!(metrics.order_reference_conflicts_total.get(), 3);
        assert_eq!(service.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_references_are_independently_retrievable() {
        let (service, _, _) = service();

        let first = service.create_order(request("R1", &[1])).await.unwrap();
        let second = service.create_order(request("R2", &[3, 4])).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(service.get_order(first.id).await.unwrap(), first);
        assert_eq!(service.get_order(second.id).await.unwrap(), second);
        assert_eq!(service.list_orders().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_quantity() {
        let (service, _, _) = service();

        let err = service.create_order(request("R1", &[1, 0])).await.unwrap_err();

        assert_eq!(code_of(&err), Some("InvalidOrderLineQuantity"));
        assert!(service.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_order_is_not_found() {
        let (service, _, _) = service();

        let err = service.get_order(Uuid::now_v7()).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(code_of(&err), Some("OrderNotFound"));
    }

    // Supplied lines replace the stored ones; id and reference are preserved.
    #[tokio::test]
    async fn test_update_order_applies_supplied_lines() {
        let (service, store, _) = service();
        let created = service.create_order(request("R1", &[1, 2])).await.unwrap();
        let replacement = vec![LineItem::new(Uuid::new_v4(), 5)];

        let updated = service
            .update_order(created.id, replacement.clone())
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.reference, "R1");
        assert_eq!(updated.order_lines, replacement);
        assert_eq!(service.get_order(created.id).await.unwrap(), updated);
        assert_eq!(store.order_line_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_order_is_not_found() {
        let (service, _, _) = service();

        let err = service
            .update_order(Uuid::now_v7(), vec![LineItem::new(Uuid::new_v4(), 1)])
            .await
            .unwrap_err();

        assert_eq!(code_of(&err), Some("OrderNotFound"));
    }

    #[tokio::test]
    async fn test_update_with_invalid_quantity_keeps_existing_lines() {
        let (service, _, _) = service();
        let created = service.create_order(request("R1", &[1])).await.unwrap();

        let err = service
            .update_order(created.id, vec![LineItem::new(Uuid::new_v4(), -1)])
            .await
            .unwrap_err();

        assert_eq!(code_of(&err), Some("InvalidOrderLineQuantity"));
        assert_eq!(service.get_order(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_delete_unknown_order_is_not_found() {
        let (service, _, metrics) = service();

        let err = service.delete_order(Uuid::now_v7()).await.unwrap_err();

        assert_eq!(code_of(&err), Some("OrderNotFound"));
        assert_eq!(metrics.orders_deleted_total.get(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_order_and_lines() {
        let (service, store, metrics) = service();
        let created = service.create_order(request("R1", &[1, 2, 3])).await.unwrap();

        service.delete_order(created.id).await.unwrap();

        let err = service.get_order(created.id).await.unwrap_err();
        assert_eq!(code_of(&err), Some("OrderNotFound"));
        assert_eq!(store.order_line_count().await, 0);
        assert_eq!(metrics.orders_deleted_total.get(), 1);
    }
}
