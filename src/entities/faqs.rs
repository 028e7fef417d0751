use chrono::{DateTime, Utc};
use sea_orm::{entity::prelude::*, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::users::{self, Role};

/// Author details frozen at the time a question or answer was written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSnapshot {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub picture: Option<String>,
}

impl From<&users::Model> for AuthorSnapshot {
    fn from(account: &users::Model) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
            picture: Some(account.display_picture()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: Uuid,
    pub author: AuthorSnapshot,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AnswerList(pub Vec<Answer>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "faqs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub author: AuthorSnapshot,
    pub question: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub answers: AnswerList,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn answer(&self, answer_id: Uuid) -> Option<&Answer> {
        self.answers.0.iter().find(|answer| answer.id == answer_id)
    }

    pub fn answer_mut(&mut self, answer_id: Uuid) -> Option<&mut Answer> {
        self.answers.0.iter_mut().find(|answer| answer.id == answer_id)
    }
}
