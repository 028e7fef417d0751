use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{optional_number, parse_id, Numeric};
use crate::{
    entities::leads::{self, LeadStatus, VehicleSnapshot},
    error::{ApiError, ApiJson, ErrorResponse},
    middleware::auth::AdminAccount,
    service::leads::NewLead,
    state::AppState,
};

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePayload {
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<Numeric>,
    pub engine_size: Option<Numeric>,
    pub category: Option<String>,
    pub weight: Option<Numeric>,
    pub top_speed: Option<Numeric>,
    pub description: Option<String>,
}

impl VehiclePayload {
    fn into_snapshot(self) -> Result<VehicleSnapshot, ApiError> {
        Ok(VehicleSnapshot {
            price: optional_number(self.price.as_ref(), "vehicle.price")?.unwrap_or(0.0),
            engine_size: optional_number(self.engine_size.as_ref(), "vehicle.engineSize")?
                .unwrap_or(0.0),
            weight: optional_number(self.weight.as_ref(), "vehicle.weight")?.unwrap_or(0.0),
            top_speed: optional_number(self.top_speed.as_ref(), "vehicle.topSpeed")?
                .unwrap_or(0.0),
            name: self.name.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub trade_in: Option<bool>,
    pub financing: Option<bool>,
    pub vehicle: Option<VehiclePayload>,
    pub product_id: Option<String>,
}

impl CreateLeadRequest {
    fn into_new_lead(self) -> Result<NewLead, ApiError> {
        let product_id = self
            .product_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(parse_id)
            .transpose()?;

        Ok(NewLead {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            trade_in: self.trade_in.unwrap_or(false),
            financing: self.financing.unwrap_or(false),
            vehicle: self.vehicle.unwrap_or_default().into_snapshot()?,
            product_id,
        })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub trade_in: bool,
    pub financing: bool,
    pub vehicle: VehicleSnapshot,
    pub product_id: Option<Uuid>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<leads::Model> for LeadResponse {
    fn from(model: leads::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            message: model.message,
            trade_in: model.trade_in,
            financing: model.financing,
            vehicle: model.vehicle,
            product_id: model.product_id,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LeadStatsResponse {
    pub pending: u64,
    pub confirmed: u64,
    pub cancelled: u64,
    pub total: u64,
}

#[derive(Serialize, ToSchema)]
pub struct DeletedLeadResponse {
    pub message: String,
    pub lead: LeadResponse,
}

#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Inquiry recorded", body = LeadResponse),
        (status = 400, description = "Missing name or phone", body = ErrorResponse)
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), ApiError> {
    let created = state.leads().create(payload.into_new_lead()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Leads, newest first", body = [LeadResponse])
    )
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
) -> Result<Json<Vec<LeadResponse>>, ApiError> {
    let leads = state.leads().list().await?;
    Ok(Json(leads.into_iter().map(LeadResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/leads/stats/count",
    tag = "leads",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Lead counts by status", body = LeadStatsResponse)
    )
)]
pub async fn lead_stats(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
) -> Result<Json<LeadStatsResponse>, ApiError> {
    let stats = state.leads().stats().await?;
    Ok(Json(LeadStatsResponse {
        pending: stats.pending,
        confirmed: stats.confirmed,
        cancelled: stats.cancelled,
        total: stats.total(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "leads",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Lead id")
    ),
    responses(
        (status = 200, description = "Lead", body = LeadResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
) -> Result<Json<LeadResponse>, ApiError> {
    let lead = state.leads().get(parse_id(&id)?).await?;
    Ok(Json(lead.into()))
}

#[utoipa::path(
    put,
    path = "/api/leads/{id}/status",
    tag = "leads",
    security(("bearer" = [])),
    request_body = UpdateStatusRequest,
    params(
        ("id" = String, Path, description = "Lead id")
    ),
    responses(
        (status = 200, description = "Status changed", body = LeadResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_lead_status(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<Json<LeadResponse>, ApiError> {
    let id = parse_id(&id)?;
    let status: LeadStatus = payload
        .status
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| {
            ApiError::validation(
                "invalid_status",
                "status must be pending, confirmed or cancelled",
            )
        })?;

    let updated = state.leads().set_status(id, status).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "leads",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Lead id")
    ),
    responses(
        (status = 200, description = "Deleted", body = DeletedLeadResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
) -> Result<Json<DeletedLeadResponse>, ApiError> {
    let deleted = state.leads().delete(parse_id(&id)?).await?;
    Ok(Json(DeletedLeadResponse {
        message: "lead deleted".to_string(),
        lead: deleted.into(),
    }))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/leads", get(list_leads).post(create_lead))
        .route("/api/leads/stats/count", get(lead_stats))
        .route("/api/leads/:id", get(get_lead).delete(delete_lead))
        .route("/api/leads/:id/status", put(update_lead_status))
        .with_state(state)
}
