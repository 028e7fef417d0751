use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[sea_orm(string_value = "local")]
    Local,
    #[sea_orm(string_value = "google")]
    Google,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub google_id: Option<String>,
    pub profile_picture: Option<String>,
    pub asset_public_id: Option<String>,
    pub provider: Provider,
    pub has_custom_avatar: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("account already signs in with google")]
pub struct AlreadyExternal;

impl Model {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_google(&self) -> bool {
        self.provider == Provider::Google
    }

    /// Picture shown to clients: a custom avatar wins, then the Google
    /// picture, then a generated initials avatar.
    pub fn display_picture(&self) -> String {
        if let Some(picture) = self.profile_picture.as_deref().filter(|p| !p.is_empty()) {
            if self.has_custom_avatar || self.is_google() {
                return picture.to_string();
            }
        }
        format!(
            "https://ui-avatars.com/api/?name={}&background=random&color=fff&size=200",
            urlencoding::encode(&self.name)
        )
    }

    /// Switches a password account over to Google sign-in. The account keeps
    /// its id and password hash; there is no transition back to `Local`.
    pub fn migrate_to_google(
        &mut self,
        google_id: String,
        picture: Option<String>,
    ) -> Result<(), AlreadyExternal> {
        if self.provider != Provider::Local {
            return Err(AlreadyExternal);
        }
        self.google_id = Some(google_id);
        self.profile_picture = picture;
        self.provider = Provider::Google;
        self.has_custom_avatar = false;
        Ok(())
    }
}
