use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::products::{self, Category, PLACEHOLDER_IMAGE},
    error::ApiError,
    repo::products::ProductsRepo,
    service::assets::{public_id_from_url, AssetStore},
};

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub description: String,
    pub image: Option<String>,
    pub engine_size: f64,
    pub top_speed: f64,
    pub weight: f64,
    pub stock: i32,
    pub available: bool,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub engine_size: Option<f64>,
    pub top_speed: Option<f64>,
    pub weight: Option<f64>,
    pub stock: Option<i32>,
    pub available: Option<bool>,
}

#[async_trait]
pub trait ProductsService: Send + Sync {
    async fn list(&self) -> Result<Vec<products::Model>, ApiError>;
    async fn get(&self, id: Uuid) -> Result<products::Model, ApiError>;
    async fn create(&self, input: NewProduct) -> Result<products::Model, ApiError>;
    async fn update(&self, id: Uuid, changes: ProductChanges)
        -> Result<products::Model, ApiError>;
    async fn delete(&self, id: Uuid) -> Result<products::Model, ApiError>;
}

pub struct ProductsServiceImpl {
    products: Arc<dyn ProductsRepo>,
    assets: Arc<dyn AssetStore>,
}

fn not_found() -> ApiError {
    ApiError::not_found("product_not_found", "product not found")
}

fn validate(product: &products::Model) -> Result<(), ApiError> {
    if product.name.trim().is_empty() {
        return Err(ApiError::validation("invalid_product", "name is required"));
    }
    if product.description.trim().is_empty() {
        return Err(ApiError::validation("invalid_product", "description is required"));
    }
    if product.stock < 0 {
        return Err(ApiError::validation("invalid_product", "stock cannot be negative"));
    }
    for (field, value) in [
        ("price", product.price),
        ("engineSize", product.engine_size),
        ("topSpeed", product.top_speed),
        ("weight", product.weight),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ApiError::validation(
                "invalid_product",
                format!("{field} must be a non-negative number"),
            ));
        }
    }
    Ok(())
}

impl ProductsServiceImpl {
    pub fn new(products: Arc<dyn ProductsRepo>, assets: Arc<dyn AssetStore>) -> Self {
        Self { products, assets }
    }
}

#[async_trait]
impl ProductsService for ProductsServiceImpl {
    async fn list(&self) -> Result<Vec<products::Model>, ApiError> {
        Ok(self.products.list().await?)
    }

    async fn get(&self, id: Uuid) -> Result<products::Model, ApiError> {
        self.products.find_by_id(id).await?.ok_or_else(not_found)
    }

    async fn create(&self, input: NewProduct) -> Result<products::Model, ApiError> {
        let now = Utc::now().into();
        let product = products::Model {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            category: input.category,
            price: input.price,
            description: input.description.trim().to_string(),
            image: input
                .image
                .map(|image| image.trim().to_string())
                .filter(|image| !image.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            engine_size: input.engine_size,
            top_speed: input.top_speed,
            weight: input.weight,
            stock: input.stock,
            available: input.available,
            created_at: now,
            updated_at: now,
        };
        validate(&product)?;

        let product = self.products.insert(product).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "created product");
        Ok(product)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<products::Model, ApiError> {
        let mut product = self.products.find_by_id(id).await?.ok_or_else(not_found)?;

        if let Some(name) = changes.name {
            product.name = name.trim().to_string();
        }
        if let Some(category) = changes.category {
            product.category = category;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(description) = changes.description {
            product.description = description.trim().to_string();
        }
        if let Some(image) = changes.image.filter(|image| !image.trim().is_empty()) {
            product.image = image.trim().to_string();
        }
        if let Some(engine_size) = changes.engine_size {
            product.engine_size = engine_size;
        }
        if let Some(top_speed) = changes.top_speed {
            product.top_speed = top_speed;
        }
        if let Some(weight) = changes.weight {
            product.weight = weight;
        }
        if let Some(stock) = changes.stock {
            product.stock = stock;
        }
        if let Some(available) = changes.available {
            product.available = available;
        }
        validate(&product)?;

        let product = self.products.update(product).await?;
        tracing::info!(product_id = %product.id, "updated product");
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> Result<products::Model, ApiError> {
        let product = self.products.find_by_id(id).await?.ok_or_else(not_found)?;

        if let Some(public_id) = public_id_from_url(&product.image) {
            if let Err(err) = self.assets.destroy(&public_id).await {
                tracing::warn!(
                    product_id = %id,
                    public_id,
                    error = %err,
                    "failed to destroy product image"
                );
            }
        }

        self.products.delete(id).await?;
        tracing::info!(product_id = %id, "deleted product");
        Ok(product)
    }
}
