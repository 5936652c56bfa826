use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::LineItem;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// An Order exclusively owns its OrderLines. Lines are created together with
// the order (or when the order's lines are replaced) and carry the owning
// order's id.
//
// Reference uniqueness is NOT checked here: the store enforces it and the
// service layer surfaces the violation as a conflict.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: Uuid,
    reference: String,
    lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity(quantity));
    }
    Ok(())
}

impl Order {
    /// Create a new order with a fresh time-ordered id and the given lines.
    pub fn create(
        reference: impl Into<String>,
        items: impl IntoIterator<Item = LineItem>,
    ) -> Result<Self, OrderError> {
        let mut order = Self {
            id: Uuid::now_v7(),
            reference: reference.into(),
            lines: Vec::new(),
        };

        for item in items {
            order.add_line(item)?;
        }

        Ok(order)
    }

    /// Rebuild an order from persisted state. No validation is applied.
    pub fn restore(id: Uuid, reference: String, lines: Vec<OrderLine>) -> Self {
        Self { id, reference, lines }
    }

    pub fn add_line(&mut self, item: LineItem) -> Result<(), OrderError> {
        let line = OrderLine::new(self.id, item)?;
        self.lines.push(line);
        Ok(())
    }

    /// Replace every line of the order. Either all items are valid and the
    /// lines are swapped, or the order is left untouched.
    pub fn replace_lines(
        &mut self,
        items: impl IntoIterator<Item = LineItem>,
    ) -> Result<(), OrderError> {
        let lines = items
            .into_iter()
            .map(|item| OrderLine::new(self.id, item))
            .collect::<Result<Vec<_>, _>>()?;

        self.lines = lines;
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.lines.iter().map(OrderLine::item).collect()
    }
}

impl OrderLine {
    pub fn new(order_id: Uuid, item: LineItem) -> Result<Self, OrderError> {
        validate_quantity(item.quantity)?;

        Ok(Self {
            id: Uuid::now_v7(),
            order_id,
            product_id: item.product_id,
            quantity: item.quantity,
        })
    }

    pub fn restore(id: Uuid, order_id: Uuid, product_id: Uuid, quantity: i32) -> Self {
        Self {
            id,
            order_id,
            product_id,
            quantity,
        }
    }

    pub fn add_quantity(&mut self, quantity: i32) -> Result<(), OrderError> {
        validate_quantity(quantity)?;

        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or(OrderError::QuantityOverflow {
                current: self.quantity,
                added: quantity,
            })?;
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn item(&self) -> LineItem {
        LineItem::new(self.product_id, self.quantity)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
