use std::sync::Arc;
use uuid::Uuid;

use super::dto::ProductDto;
use super::errors::{codes, ServiceError};
use crate::store::ProductRepository;

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductDto, ServiceError> {
        match self.products.find_product(id).await? {
            Some(product) => Ok(ProductDto::from(product)),
            None => {
                tracing::warn!(product_id = %id, "Product was not found");
                Err(ServiceError::NotFound(codes::PRODUCT_NOT_FOUND))
            }
        }
    }

    /// All products. No pagination or filtering.
    pub async fn list_products(&self) -> Result<Vec<ProductDto>, ServiceError> {
        let products = self.products.list_products().await?;
        Ok(products.into_iter().map(ProductDto::from).collect())
    }
}
