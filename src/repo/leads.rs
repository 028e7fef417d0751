use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::leads::{self, LeadStatus},
    state::DatabaseClient,
};

#[async_trait]
pub trait LeadsRepo: Send + Sync {
    async fn insert(&self, model: leads::Model) -> Result<leads::Model, sea_orm::DbErr>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<leads::Model>, sea_orm::DbErr>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<leads::Model>, sea_orm::DbErr>;
    async fn update(&self, model: leads::Model) -> Result<leads::Model, sea_orm::DbErr>;
    async fn delete(&self, id: Uuid) -> Result<u64, sea_orm::DbErr>;
    async fn count_by_status(&self, status: LeadStatus) -> Result<u64, sea_orm::DbErr>;
}

pub struct SeaOrmLeadsRepo {
    db: Arc<dyn DatabaseClient>,
}

impl SeaOrmLeadsRepo {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LeadsRepo for SeaOrmLeadsRepo {
    async fn insert(&self, model: leads::Model) -> Result<leads::Model, sea_orm::DbErr> {
        model
            .into_active_model()
            .reset_all()
            .insert(self.db.conn())
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<leads::Model>, sea_orm::DbErr> {
        leads::Entity::find_by_id(id).one(self.db.conn()).await
    }

    async fn list(&self) -> Result<Vec<leads::Model>, sea_orm::DbErr> {
        leads::Entity::find()
            .order_by_desc(leads::Column::CreatedAt)
            .all(self.db.conn())
            .await
    }

    async fn update(&self, model: leads::Model) -> Result<leads::Model, sea_orm::DbErr> {
        model
            .into_active_model()
            .reset_all()
            .update(self.db.conn())
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, sea_orm::DbErr> {
        let result = leads::Entity::delete_by_id(id).exec(self.db.conn()).await?;
        Ok(result.rows_affected)
    }

    async fn count_by_status(&self, status: LeadStatus) -> Result<u64, sea_orm::DbErr> {
        leads::Entity::find()
            .filter(leads::Column::Status.eq(status))
            .count(self.db.conn())
            .await
    }
}
