use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::leads::{self, LeadStatus, VehicleSnapshot},
    error::ApiError,
    repo::leads::LeadsRepo,
};

#[derive(Debug, Clone, Default)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub trade_in: bool,
    pub financing: bool,
    pub vehicle: VehicleSnapshot,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadStats {
    pub pending: u64,
    pub confirmed: u64,
    pub cancelled: u64,
}

impl LeadStats {
    pub fn total(&self) -> u64 {
        self.pending + self.confirmed + self.cancelled
    }
}

#[async_trait]
pub trait LeadsService: Send + Sync {
    async fn create(&self, input: NewLead) -> Result<leads::Model, ApiError>;
    async fn list(&self) -> Result<Vec<leads::Model>, ApiError>;
    async fn get(&self, id: Uuid) -> Result<leads::Model, ApiError>;
    async fn stats(&self) -> Result<LeadStats, ApiError>;
    async fn set_status(&self, id: Uuid, status: LeadStatus) -> Result<leads::Model, ApiError>;
    async fn delete(&self, id: Uuid) -> Result<leads::Model, ApiError>;
}

pub struct LeadsServiceImpl {
    leads: Arc<dyn LeadsRepo>,
}

fn not_found() -> ApiError {
    ApiError::not_found("lead_not_found", "lead not found")
}

impl LeadsServiceImpl {
    pub fn new(leads: Arc<dyn LeadsRepo>) -> Self {
        Self { leads }
    }
}

#[async_trait]
impl LeadsService for LeadsServiceImpl {
    async fn create(&self, input: NewLead) -> Result<leads::Model, ApiError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("missing_fields", "name is required"));
        }
        let phone = input.phone.trim();
        if phone.is_empty() {
            return Err(ApiError::validation("missing_fields", "phone is required"));
        }

        let now = Utc::now().into();
        let lead = self
            .leads
            .insert(leads::Model {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: input.email.trim().to_lowercase(),
                phone: phone.to_string(),
                message: input.message,
                trade_in: input.trade_in,
                financing: input.financing,
                vehicle: input.vehicle,
                product_id: input.product_id,
                status: LeadStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .await?;
        tracing::info!(lead_id = %lead.id, vehicle = %lead.vehicle.name, "created lead");
        Ok(lead)
    }

    async fn list(&self) -> Result<Vec<leads::Model>, ApiError> {
        Ok(self.leads.list().await?)
    }

    async fn get(&self, id: Uuid) -> Result<leads::Model, ApiError> {
        self.leads.find_by_id(id).await?.ok_or_else(not_found)
    }

    async fn stats(&self) -> Result<LeadStats, ApiError> {
        Ok(LeadStats {
            pending: self.leads.count_by_status(LeadStatus::Pending).await?,
            confirmed: self.leads.count_by_status(LeadStatus::Confirmed).await?,
            cancelled: self.leads.count_by_status(LeadStatus::Cancelled).await?,
        })
    }

    async fn set_status(&self, id: Uuid, status: LeadStatus) -> Result<leads::Model, ApiError> {
        let mut lead = self.leads.find_by_id(id).await?.ok_or_else(not_found)?;
        lead.status = status;
        let lead = self.leads.update(lead).await?;
        tracing::info!(lead_id = %lead.id, status = ?lead.status, "updated lead status");
        Ok(lead)
    }

    async fn delete(&self, id: Uuid) -> Result<leads::Model, ApiError> {
        let lead = self.leads.find_by_id(id).await?.ok_or_else(not_found)?;
        self.leads.delete(id).await?;
        tracing::info!(lead_id = %id, "deleted lead");
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryLeadsRepo;
    use axum::http::StatusCode;

    fn inquiry(name: &str) -> NewLead {
        NewLead {
            name: name.to_string(),
            email: " Buyer@Gmail.COM ".to_string(),
            phone: "555-0100".to_string(),
            vehicle: VehicleSnapshot {
                name: "Raptor 700R".to_string(),
                price: 11000.0,
                category: "atv".to_string(),
                ..VehicleSnapshot::default()
            },
            ..NewLead::default()
        }
    }

    #[tokio::test]
    async fn create_normalizes_and_starts_pending() {
        let svc = LeadsServiceImpl::new(Arc::new(MemoryLeadsRepo::default()));

        let lead = svc.create(inquiry(" Juan ")).await.unwrap();

        assert_eq!(lead.name, "Juan");
        assert_eq!(lead.email, "buyer@gmail.com");
        assert_eq!(lead.status, LeadStatus::Pending);
        assert_eq!(lead.vehicle.name, "Raptor 700R");
    }

    #[tokio::test]
    async fn create_requires_name_and_phone() {
        let svc = LeadsServiceImpl::new(Arc::new(MemoryLeadsRepo::default()));

        let err = svc.create(inquiry("  ")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let mut no_phone = inquiry("Juan");
        no_phone.phone = String::new();
        assert!(svc.create(no_phone).await.is_err());
    }

    #[tokio::test]
    async fn stats_follow_status_changes() {
        let svc = LeadsServiceImpl::new(Arc::new(MemoryLeadsRepo::default()));
        let first = svc.create(inquiry("A")).await.unwrap();
        let second = svc.create(inquiry("B")).await.unwrap();
        svc.create(inquiry("C")).await.unwrap();

        svc.set_status(first.id, LeadStatus::Confirmed).await.unwrap();
        svc.set_status(second.id, LeadStatus::Cancelled).await.unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(
            stats,
            LeadStats {
                pending: 1,
                confirmed: 1,
                cancelled: 1
            }
        );
        assert_eq!(stats.total(), 3);
    }

    #[tokio::test]
    async fn delete_returns_removed_lead() {
        let svc = LeadsServiceImpl::new(Arc::new(MemoryLeadsRepo::default()));
        let lead = svc.create(inquiry("A")).await.unwrap();

        assert_eq!(svc.delete(lead.id).await.unwrap().id, lead.id);
        assert_eq!(
            svc.get(lead.id).await.unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
    }
}
