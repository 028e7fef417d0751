use sea_orm::{entity::prelude::*, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl FromStr for LeadStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(()),
        }
    }
}

/// Copy of the product's display attributes taken when the inquiry is made.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleSnapshot {
    pub name: String,
    pub image: String,
    pub price: f64,
    pub engine_size: f64,
    pub category: String,
    pub weight: f64,
    pub top_speed: f64,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub trade_in: bool,
    pub financing: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub vehicle: VehicleSnapshot,
    pub product_id: Option<Uuid>,
    pub status: LeadStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Value, ValueType};

    #[test]
    fn vehicle_snapshot_is_stored_as_json() {
        let snapshot = VehicleSnapshot {
            name: "KX450".into(),
            price: 9800.0,
            category: "moto".into(),
            ..Default::default()
        };

        let value: Value = snapshot.clone().into();
        assert!(matches!(value, Value::Json(Some(_))));
        assert_eq!(<VehicleSnapshot as ValueType>::try_from(value).unwrap(), snapshot);
    }

    #[test]
    fn status_parses_trimmed_names_only() {
        assert_eq!(" confirmed ".parse::<LeadStatus>(), Ok(LeadStatus::Confirmed));
        assert!("done".parse::<LeadStatus>().is_err());
    }
}
