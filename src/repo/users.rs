use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{entities::users, state::DatabaseClient};

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn insert(&self, model: users::Model) -> Result<users::Model, sea_orm::DbErr>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, sea_orm::DbErr>;
    async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, sea_orm::DbErr>;
    async fn list(&self) -> Result<Vec<users::Model>, sea_orm::DbErr>;
    async fn update(&self, model: users::Model) -> Result<users::Model, sea_orm::DbErr>;
    async fn delete(&self, id: Uuid) -> Result<u64, sea_orm::DbErr>;
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, sea_orm::DbErr>;
}

pub struct SeaOrmUsersRepo {
    db: Arc<dyn DatabaseClient>,
}

impl SeaOrmUsersRepo {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepo for SeaOrmUsersRepo {
    async fn insert(&self, model: users::Model) -> Result<users::Model, sea_orm::DbErr> {
        model
            .into_active_model()
            .reset_all()
            .insert(self.db.conn())
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, sea_orm::DbErr> {
        users::Entity::find_by_id(id).one(self.db.conn()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, sea_orm::DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db.conn())
            .await
    }

    async fn list(&self) -> Result<Vec<users::Model>, sea_orm::DbErr> {
        users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(self.db.conn())
            .await
    }

    async fn update(&self, model: users::Model) -> Result<users::Model, sea_orm::DbErr> {
        model
            .into_active_model()
            .reset_all()
            .update(self.db.conn())
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, sea_orm::DbErr> {
        let result = users::Entity::delete_by_id(id).exec(self.db.conn()).await?;
        Ok(result.rows_affected)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, sea_orm::DbErr> {
        let result = users::Entity::delete_many()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .exec(self.db.conn())
            .await?;
        Ok(result.rows_affected)
    }
}
