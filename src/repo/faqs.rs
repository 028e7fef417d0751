use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder};
use std::sync::Arc;
use uuid::Uuid;

use crate::{entities::faqs, state::DatabaseClient};

#[async_trait]
pub trait FaqsRepo: Send + Sync {
    async fn insert(&self, model: faqs::Model) -> Result<faqs::Model, sea_orm::DbErr>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<faqs::Model>, sea_orm::DbErr>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<faqs::Model>, sea_orm::DbErr>;
    async fn update(&self, model: faqs::Model) -> Result<faqs::Model, sea_orm::DbErr>;
    async fn delete(&self, id: Uuid) -> Result<u64, sea_orm::DbErr>;
}

pub struct SeaOrmFaqsRepo {
    db: Arc<dyn DatabaseClient>,
}

impl SeaOrmFaqsRepo {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FaqsRepo for SeaOrmFaqsRepo {
    async fn insert(&self, model: faqs::Model) -> Result<faqs::Model, sea_orm::DbErr> {
        model
            .into_active_model()
            .reset_all()
            .insert(self.db.conn())
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<faqs::Model>, sea_orm::DbErr> {
        faqs::Entity::find_by_id(id).one(self.db.conn()).await
    }

    async fn list(&self) -> Result<Vec<faqs::Model>, sea_orm::DbErr> {
        faqs::Entity::find()
            .order_by_desc(faqs::Column::CreatedAt)
            .all(self.db.conn())
            .await
    }

    async fn update(&self, model: faqs::Model) -> Result<faqs::Model, sea_orm::DbErr> {
        model
            .into_active_model()
            .reset_all()
            .update(self.db.conn())
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, sea_orm::DbErr> {
        let result = faqs::Entity::delete_by_id(id).exec(self.db.conn()).await?;
        Ok(result.rows_affected)
    }
}
