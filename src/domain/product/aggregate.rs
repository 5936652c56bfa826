use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use super::errors::ProductError;

/// A catalog product. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: Uuid,
    name: String,
    price: BigDecimal,
}

impl Product {
    pub fn new(name: impl Into<String>, price: BigDecimal) -> Result<Self, ProductError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        if price < BigDecimal::zero() {
            return Err(ProductError::NegativePrice(price));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            name,
            price,
        })
    }

    /// Rebuild a product from persisted state. No validation is applied.
    pub fn restore(id: Uuid, name: String, price: BigDecimal) -> Self {
        Self { id, name, price }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &BigDecimal {
        &self.price
    }
}
