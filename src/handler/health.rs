use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct Endpoints {
    pub leads: &'static str,
    pub products: &'static str,
    pub auth: &'static str,
    pub users: &'static str,
    pub faq: &'static str,
}

#[derive(Serialize, ToSchema)]
pub struct Banner {
    pub message: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Endpoints,
}

#[derive(Serialize, ToSchema)]
pub struct Health {
    pub status: &'static str,
    /// `connected` or `disconnected`.
    pub database: &'static str,
    /// Seconds since the process started.
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service banner", body = Banner)
    )
)]
pub async fn banner() -> Json<Banner> {
    Json(Banner {
        message: "store api is running",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        endpoints: Endpoints {
            leads: "/api/leads",
            products: "/api/products",
            auth: "/api/auth",
            users: "/api/users",
            faq: "/api/faq",
        },
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health", body = Health)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    let database = if state.db().is_connected().await {
        "connected"
    } else {
        "disconnected"
    };
    Json(Health {
        status: "ok",
        database,
        uptime: state.uptime_secs(),
        timestamp: Utc::now(),
    })
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .with_state(state)
}
