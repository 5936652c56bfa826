use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{LineItem, Order};
use crate::domain::product::Product;

// ============================================================================
// Data Transfer Objects - JSON contract of the HTTP API
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderDto {
    pub reference: String,
    #[serde(default)]
    pub order_lines: Vec<LineItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: Uuid,
    pub reference: String,
    pub order_lines: Vec<LineItem>,
}

/// Price is carried as a decimal string to keep full precision.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            reference: order.reference().to_string(),
            order_lines: order.line_items(),
        }
    }
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id(),
            name: product.name().to_string(),
            price: product.price().clone(),
        }
    }
}
