use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::{auth::UserResponse, parse_id, MessageResponse};
use crate::{
    error::{ApiError, ApiJson, ErrorResponse},
    middleware::auth::AdminAccount,
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted_count: u64,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All accounts, newest first", body = [UserResponse]),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let accounts = state.accounts().list().await?;
    Ok(Json(accounts.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/users/admin",
    tag = "users",
    security(("bearer" = [])),
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Administrator created", body = UserResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    AdminAccount(caller): AdminAccount,
    ApiJson(payload): ApiJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let created = state
        .accounts()
        .create_admin(
            payload.name.as_deref().unwrap_or_default(),
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    tracing::info!(created_by = %caller.id, account_id = %created.id, "administrator created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminAccount(caller): AdminAccount,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state.accounts().delete(id).await?;

    tracing::info!(deleted_by = %caller.id, account_id = %deleted.id, "account deleted");
    Ok(Json(MessageResponse {
        message: format!("user {} deleted", deleted.email),
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/bulk-delete",
    tag = "users",
    security(("bearer" = [])),
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Accounts deleted", body = BulkDeleteResponse),
        (status = 400, description = "Empty or malformed id list", body = ErrorResponse)
    )
)]
pub async fn bulk_delete(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    ApiJson(payload): ApiJson<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    let ids = payload
        .ids
        .iter()
        .map(|id| parse_id(id))
        .collect::<Result<Vec<_>, _>>()?;

    let deleted_count = state.accounts().bulk_delete(&ids).await?;
    Ok(Json(BulkDeleteResponse {
        message: format!("{deleted_count} users deleted"),
        deleted_count,
    }))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/admin", post(create_admin))
        .route("/api/users/bulk-delete", post(bulk_delete))
        .route("/api/users/:id", delete(delete_user))
        .with_state(state)
}
