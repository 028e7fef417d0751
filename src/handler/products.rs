use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{optional_number, parse_id, MessageResponse, Numeric};
use crate::{
    entities::products::{self, Category},
    error::{ApiError, ApiJson, ErrorResponse},
    middleware::auth::AdminAccount,
    service::products::{NewProduct, ProductChanges},
    state::AppState,
};

/// Create and update body. On update every field is optional.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Numeric>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Freshly uploaded picture from the admin form; wins over `image`.
    pub image_url: Option<String>,
    pub engine_size: Option<Numeric>,
    pub top_speed: Option<Numeric>,
    pub weight: Option<Numeric>,
    pub stock: Option<Numeric>,
    pub available: Option<bool>,
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::validation("invalid_category", "category must be moto, utv or atv")
    })
}

impl ProductPayload {
    fn image(&self) -> Option<String> {
        self.image_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.image.clone())
    }

    fn stock(&self) -> Result<Option<i32>, ApiError> {
        self.stock.as_ref().map(|stock| stock.to_i32("stock")).transpose()
    }

    fn into_new_product(self) -> Result<NewProduct, ApiError> {
        let missing = || {
            ApiError::validation(
                "missing_fields",
                "name, category, price and description are required",
            )
        };
        let category = self.category.as_deref().ok_or_else(missing)?;
        let price = self.price.as_ref().ok_or_else(missing)?;

        Ok(NewProduct {
            category: parse_category(category)?,
            price: price.to_f64("price")?,
            image: self.image(),
            engine_size: optional_number(self.engine_size.as_ref(), "engineSize")?.unwrap_or(0.0),
            top_speed: optional_number(self.top_speed.as_ref(), "topSpeed")?.unwrap_or(0.0),
            weight: optional_number(self.weight.as_ref(), "weight")?.unwrap_or(0.0),
            stock: self.stock()?.unwrap_or(0),
            available: self.available.unwrap_or(true),
            name: self.name.ok_or_else(missing)?,
            description: self.description.ok_or_else(missing)?,
        })
    }

    fn into_changes(self) -> Result<ProductChanges, ApiError> {
        Ok(ProductChanges {
            category: self.category.as_deref().map(parse_category).transpose()?,
            price: optional_number(self.price.as_ref(), "price")?,
            image: self.image(),
            engine_size: optional_number(self.engine_size.as_ref(), "engineSize")?,
            top_speed: optional_number(self.top_speed.as_ref(), "topSpeed")?,
            weight: optional_number(self.weight.as_ref(), "weight")?,
            stock: self.stock()?,
            available: self.available,
            name: self.name,
            description: self.description,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub engine_size: f64,
    pub top_speed: f64,
    pub weight: f64,
    pub stock: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for ProductResponse {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            price: model.price,
            description: model.description,
            image: model.image,
            engine_size: model.engine_size,
            top_speed: model.top_speed,
            weight: model.weight,
            stock: model.stock,
            available: model.available,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    responses(
        (status = 200, description = "Catalog", body = [ProductResponse])
    )
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.products().list().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "products",
    params(
        ("id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.products().get(parse_id(&id)?).await?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    security(("bearer" = [])),
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Created", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let created = state.products().create(payload.into_new_product()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "products",
    security(("bearer" = [])),
    request_body = ProductPayload,
    params(
        ("id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Updated", body = ProductResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id = parse_id(&id)?;
    let updated = state.products().update(id, payload.into_changes()?).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "products",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.products().delete(parse_id(&id)?).await?;
    Ok(Json(MessageResponse {
        message: format!("product {} deleted", deleted.name),
    }))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> ProductPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_requires_core_fields() {
        let err = payload(json!({"name": "KX", "category": "moto"}))
            .into_new_product()
            .unwrap_err();
        assert_eq!(err.code(), "missing_fields");
    }

    #[test]
    fn create_applies_defaults_and_prefers_image_url_over_image() {
        let input = payload(json!({
            "name": "Pioneer",
            "category": "UTV",
            "price": 15000,
            "description": "Side by side",
            "image": "https://cdn/old.png",
            "imageUrl": "https://cdn/new-upload.png"
        }))
        .into_new_product()
        .unwrap();

        assert_eq!(input.category, Category::Utv);
        assert_eq!(input.image.as_deref(), Some("https://cdn/new-upload.png"));
        assert_eq!(input.stock, 0);
        assert_eq!(input.weight, 0.0);
        assert!(input.available);
    }

    #[test]
    fn changes_take_uploaded_image_url_and_fall_back_to_image() {
        let changes = payload(json!({
            "image": "https://cdn/old.png",
            "imageUrl": "https://cdn/new-upload.png"
        }))
        .into_changes()
        .unwrap();
        assert_eq!(changes.image.as_deref(), Some("https://cdn/new-upload.png"));

        let changes = payload(json!({"image": "https://cdn/old.png", "imageUrl": " "}))
            .into_changes()
            .unwrap();
        assert_eq!(changes.image.as_deref(), Some("https://cdn/old.png"));
    }

    #[test]
    fn changes_reject_unknown_category_and_fractional_stock() {
        let err = payload(json!({"category": "boat"})).into_changes().unwrap_err();
        assert_eq!(err.code(), "invalid_category");

        let err = payload(json!({"stock": "1.5"})).into_changes().unwrap_err();
        assert_eq!(err.code(), "invalid_number");
    }
}
