use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::{error::ApiError, openapi::ApiDoc, state::AppState};

pub mod auth;
pub mod faq;
pub mod health;
pub mod leads;
pub mod products;
pub mod users;

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// A JSON number, or a string holding one (form inputs often send strings).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub fn to_f64(&self, field: &str) -> Result<f64, ApiError> {
        let value = match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite()).ok_or_else(|| {
            ApiError::validation("invalid_number", format!("{field} must be a number"))
        })
    }

    pub fn to_i32(&self, field: &str) -> Result<i32, ApiError> {
        let value = self.to_f64(field)?;
        if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
            return Err(ApiError::validation(
                "invalid_number",
                format!("{field} must be a whole number"),
            ));
        }
        Ok(value as i32)
    }
}

pub(crate) fn optional_number(
    value: Option<&Numeric>,
    field: &str,
) -> Result<Option<f64>, ApiError> {
    value.map(|value| value.to_f64(field)).transpose()
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::validation("invalid_id", "invalid id"))
}

#[derive(Serialize)]
struct RouteNotFound {
    error: &'static str,
    path: String,
    method: String,
}

async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: "route not found",
            path: uri.path().to_string(),
            method: method.to_string(),
        }),
    )
}

/// `*` allows any origin, without credentials; otherwise only the listed
/// origins, with credentials.
fn cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_RANGE])
        .max_age(Duration::from_secs(600));

    if origins.iter().any(|origin| origin.trim() == "*") {
        tracing::warn!("CORS_ALLOWED_ORIGINS contains *; allowing any origin without credentials");
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors(&state.config().values().cors_allowed_origins);

    Router::new()
        .merge(health::routes(state.clone()))
        .merge(auth::routes(state.clone()))
        .merge(products::routes(state.clone()))
        .merge(leads::routes(state.clone()))
        .merge(users::routes(state.clone()))
        .merge(faq::routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
