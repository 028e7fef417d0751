use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::users::{self, Role},
    error::ApiError,
    repo::users::UsersRepo,
    service::{
        assets::AssetStore,
        auth::{new_local_account, normalize_email, required},
        config::ConfigService,
        passwords::hash_password,
    },
};

#[async_trait]
pub trait AccountsService: Send + Sync {
    async fn list(&self) -> Result<Vec<users::Model>, ApiError>;
    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<users::Model, ApiError>;
    async fn delete(&self, id: Uuid) -> Result<users::Model, ApiError>;
    async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, ApiError>;
    async fn upload_picture(
        &self,
        account: users::Model,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<users::Model, ApiError>;
    async fn set_preset_avatar(
        &self,
        account: users::Model,
        avatar_url: &str,
    ) -> Result<users::Model, ApiError>;
    /// Creates or promotes the administrator named by `ADMIN_EMAIL`.
    async fn ensure_bootstrap_admin(&self) -> Result<(), ApiError>;
}

pub struct AccountsServiceImpl {
    users: Arc<dyn UsersRepo>,
    assets: Arc<dyn AssetStore>,
    config: Arc<dyn ConfigService>,
}

impl AccountsServiceImpl {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        assets: Arc<dyn AssetStore>,
        config: Arc<dyn ConfigService>,
    ) -> Self {
        Self {
            users,
            assets,
            config,
        }
    }

    async fn destroy_quietly(&self, public_id: &str) {
        if let Err(err) = self.assets.destroy(public_id).await {
            tracing::warn!(public_id, error = %err, "failed to destroy stored picture");
        }
    }

    async fn insert_admin(
        &self,
        name: &str,
        email: String,
        password: &str,
    ) -> Result<users::Model, ApiError> {
        let password_hash = hash_password(password)?;
        let account = self
            .users
            .insert(new_local_account(name, email, password_hash, Role::Admin))
            .await?;
        tracing::info!(account_id = %account.id, "created admin account");
        Ok(account)
    }
}

#[async_trait]
impl AccountsService for AccountsServiceImpl {
    async fn list(&self) -> Result<Vec<users::Model>, ApiError> {
        Ok(self.users.list().await?)
    }

    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<users::Model, ApiError> {
        let message = "name, email and password are required";
        let name = required(name, message)?;
        required(email, message)?;
        if password.is_empty() {
            return Err(ApiError::validation("missing_fields", message));
        }
        let email = normalize_email(email)?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::conflict("email_taken", "email already registered"));
        }
        self.insert_admin(name, email, password).await
    }

    async fn delete(&self, id: Uuid) -> Result<users::Model, ApiError> {
        let Some(account) = self.users.find_by_id(id).await? else {
            return Err(ApiError::not_found("account_not_found", "account not found"));
        };
        self.users.delete(id).await?;
        if let Some(public_id) = account.asset_public_id.as_deref() {
            self.destroy_quietly(public_id).await;
        }
        tracing::info!(account_id = %id, "deleted account");
        Ok(account)
    }

    async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, ApiError> {
        if ids.is_empty() {
            return Err(ApiError::validation("missing_ids", "ids must be a non-empty array"));
        }

        let mut public_ids = Vec::new();
        for id in ids {
            if let Some(account) = self.users.find_by_id(*id).await? {
                public_ids.extend(account.asset_public_id);
            }
        }

        let deleted = self.users.delete_many(ids).await?;
        for public_id in &public_ids {
            self.destroy_quietly(public_id).await;
        }
        tracing::info!(requested = ids.len(), deleted, "bulk deleted accounts");
        Ok(deleted)
    }

    async fn upload_picture(
        &self,
        mut account: users::Model,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<users::Model, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::validation("no_file", "no image was received"));
        }
        if !content_type.starts_with("image/") {
            return Err(ApiError::validation(
                "invalid_file_type",
                "only image files are allowed",
            ));
        }
        let limit = self.config.values().max_upload_bytes;
        if bytes.len() > limit {
            return Err(ApiError::validation(
                "file_too_large",
                format!("image exceeds the {limit} byte limit"),
            ));
        }

        if let Some(previous) = account.asset_public_id.as_deref() {
            self.destroy_quietly(previous).await;
        }

        let public_id = format!("user_{}_{}", account.id, Utc::now().timestamp_millis());
        let uploaded = self.assets.upload(bytes, content_type, &public_id).await?;

        account.profile_picture = Some(uploaded.url);
        account.asset_public_id = Some(uploaded.public_id);
        account.has_custom_avatar = true;
        Ok(self.users.update(account).await?)
    }

    async fn set_preset_avatar(
        &self,
        mut account: users::Model,
        avatar_url: &str,
    ) -> Result<users::Model, ApiError> {
        let avatar_url = avatar_url.trim();
        if avatar_url.is_empty() {
            return Err(ApiError::validation(
                "missing_avatar_url",
                "avatarUrl is required",
            ));
        }

        if let Some(previous) = account.asset_public_id.take() {
            self.destroy_quietly(&previous).await;
        }
        account.profile_picture = Some(avatar_url.to_string());
        account.has_custom_avatar = true;
        Ok(self.users.update(account).await?)
    }

    async fn ensure_bootstrap_admin(&self) -> Result<(), ApiError> {
        let config = self.config.values();
        let (Some(email), Some(password)) =
            (config.admin_email.as_deref(), config.admin_password.as_deref())
        else {
            tracing::debug!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap");
            return Ok(());
        };
        let email = normalize_email(email)?;

        match self.users.find_by_email(&email).await? {
            Some(account) if account.is_admin() => Ok(()),
            Some(mut account) => {
                account.role = Role::Admin;
                let account = self.users.update(account).await?;
                tracing::info!(account_id = %account.id, "promoted bootstrap admin");
                Ok(())
            }
            None => {
                let name = config.admin_name.as_deref().unwrap_or("Administrator");
                self.insert_admin(name, email, password).await?;
                Ok(())
            }
        }
    }
}
