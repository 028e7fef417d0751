use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder};
use std::sync::Arc;
use uuid::Uuid;

use crate::{entities::products, state::DatabaseClient};

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn insert(&self, model: products::Model) -> Result<products::Model, sea_orm::DbErr>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<products::Model>, sea_orm::DbErr>;
    async fn list(&self) -> Result<Vec<products::Model>, sea_orm::DbErr>;
    async fn update(&self, model: products::Model) -> Result<products::Model, sea_orm::DbErr>;
    async fn delete(&self, id: Uuid) -> Result<u64, sea_orm::DbErr>;
}

pub struct SeaOrmProductsRepo {
    db: Arc<dyn DatabaseClient>,
}

impl SeaOrmProductsRepo {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductsRepo for SeaOrmProductsRepo {
    async fn insert(&self, model: products::Model) -> Result<products::Model, sea_orm::DbErr> {
        model
            .into_active_model()
            .reset_all()
            .insert(self.db.conn())
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<products::Model>, sea_orm::DbErr> {
        products::Entity::find_by_id(id).one(self.db.conn()).await
    }

    async fn list(&self) -> Result<Vec<products::Model>, sea_orm::DbErr> {
        products::Entity::find()
            .order_by_asc(products::Column::CreatedAt)
            .all(self.db.conn())
            .await
    }

    async fn update(&self, model: products::Model) -> Result<products::Model, sea_orm::DbErr> {
        model
            .into_active_model()
            .reset_all()
            .update(self.db.conn())
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, sea_orm::DbErr> {
        let result = products::Entity::delete_by_id(id)
            .exec(self.db.conn())
            .await?;
        Ok(result.rows_affected)
    }
}
