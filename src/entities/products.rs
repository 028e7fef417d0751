use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/400x300";

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "moto")]
    Moto,
    #[sea_orm(string_value = "utv")]
    Utv,
    #[sea_orm(string_value = "atv")]
    Atv,
}

impl FromStr for Category {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "moto" => Ok(Self::Moto),
            "utv" => Ok(Self::Utv),
            "atv" => Ok(Self::Atv),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub engine_size: f64,
    pub top_speed: f64,
    pub weight: f64,
    pub stock: i32,
    pub available: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
