//! In-memory stand-ins for the database and third-party services.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, DbErr};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
};
use uuid::Uuid;

use crate::{
    config::Config,
    entities::{
        faqs, leads, products,
        users::{self, Provider, Role},
    },
    error::ApiError,
    repo::{faqs::FaqsRepo, leads::LeadsRepo, products::ProductsRepo, users::UsersRepo},
    service::{
        assets::{AssetStore, UploadedAsset},
        config::ConfigServiceImpl,
        google::{GoogleProfile, IdentityVerifier},
        passwords::hash_password,
        tokens::TokenService,
    },
    state::{AppState, Backends, SeaOrmDatabaseClient},
};

pub const TEST_PASSWORD: &str = "correct horse";

fn test_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).unwrap())
        .clone()
}

pub fn account(email: &str, role: Role) -> users::Model {
    let now = Utc::now().into();
    users::Model {
        id: Uuid::new_v4(),
        name: email.split('@').next().unwrap_or("user").to_string(),
        email: email.to_string(),
        password_hash: Some(test_password_hash()),
        role,
        google_id: None,
        profile_picture: None,
        asset_public_id: None,
        provider: Provider::Local,
        has_custom_avatar: false,
        created_at: now,
        updated_at: now,
    }
}

/// Rows behind a mutex; `id` selects the primary key of a row.
struct Table<T> {
    rows: Mutex<Vec<T>>,
    id: fn(&T) -> Uuid,
}

impl<T: Clone> Table<T> {
    fn new(rows: Vec<T>, id: fn(&T) -> Uuid) -> Self {
        Self {
            rows: Mutex::new(rows),
            id,
        }
    }

    fn all(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    fn insert(&self, row: T) -> T {
        self.rows.lock().unwrap().push(row.clone());
        row
    }

    fn find(&self, id: Uuid) -> Option<T> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| (self.id)(row) == id)
            .cloned()
    }

    fn update(&self, row: T) -> Result<T, DbErr> {
        let mut rows = self.rows.lock().unwrap();
        let key = (self.id)(&row);
        let slot = rows
            .iter_mut()
            .find(|existing| (self.id)(existing) == key)
            .ok_or(DbErr::RecordNotUpdated)?;
        *slot = row.clone();
        Ok(row)
    }

    fn delete_where(&self, keep: impl Fn(&T) -> bool) -> u64 {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| keep(row));
        (before - rows.len()) as u64
    }
}

pub struct MemoryUsersRepo(Table<users::Model>);

impl MemoryUsersRepo {
    pub fn with(rows: Vec<users::Model>) -> Self {
        Self(Table::new(rows, |row: &users::Model| row.id))
    }

    pub fn all(&self) -> Vec<users::Model> {
        self.0.all()
    }
}

impl Default for MemoryUsersRepo {
    fn default() -> Self {
        Self::with(Vec::new())
    }
}

#[async_trait]
impl UsersRepo for MemoryUsersRepo {
    async fn insert(&self, model: users::Model) -> Result<users::Model, DbErr> {
        Ok(self.0.insert(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        Ok(self.0.find(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        Ok(self.0.all().into_iter().find(|row| row.email == email))
    }

    async fn list(&self) -> Result<Vec<users::Model>, DbErr> {
        Ok(self.0.all())
    }

    async fn update(&self, model: users::Model) -> Result<users::Model, DbErr> {
        self.0.update(model)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        Ok(self.0.delete_where(|row| row.id != id))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DbErr> {
        Ok(self.0.delete_where(|row| !ids.contains(&row.id)))
    }
}

pub struct MemoryProductsRepo(Table<products::Model>);

impl MemoryProductsRepo {
    pub fn all(&self) -> Vec<products::Model> {
        self.0.all()
    }
}

impl Default for MemoryProductsRepo {
    fn default() -> Self {
        Self(Table::new(Vec::new(), |row: &products::Model| row.id))
    }
}

#[async_trait]
impl ProductsRepo for MemoryProductsRepo {
    async fn insert(&self, model: products::Model) -> Result<products::Model, DbErr> {
        Ok(self.0.insert(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<products::Model>, DbErr> {
        Ok(self.0.find(id))
    }

    async fn list(&self) -> Result<Vec<products::Model>, DbErr> {
        Ok(self.0.all())
    }

    async fn update(&self, model: products::Model) -> Result<products::Model, DbErr> {
        self.0.update(model)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        Ok(self.0.delete_where(|row| row.id != id))
    }
}

pub struct MemoryLeadsRepo(Table<leads::Model>);

impl Default for MemoryLeadsRepo {
    fn default() -> Self {
        Self(Table::new(Vec::new(), |row: &leads::Model| row.id))
    }
}

#[async_trait]
impl LeadsRepo for MemoryLeadsRepo {
    async fn insert(&self, model: leads::Model) -> Result<leads::Model, DbErr> {
        Ok(self.0.insert(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<leads::Model>, DbErr> {
        Ok(self.0.find(id))
    }

    async fn list(&self) -> Result<Vec<leads::Model>, DbErr> {
        let mut rows = self.0.all();
        rows.reverse();
        Ok(rows)
    }

    async fn update(&self, model: leads::Model) -> Result<leads::Model, DbErr> {
        self.0.update(model)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        Ok(self.0.delete_where(|row| row.id != id))
    }

    async fn count_by_status(&self, status: leads::LeadStatus) -> Result<u64, DbErr> {
        Ok(self
            .0
            .all()
            .iter()
            .filter(|row| row.status == status)
            .count() as u64)
    }
}

pub struct MemoryFaqsRepo(Table<faqs::Model>);

impl Default for MemoryFaqsRepo {
    fn default() -> Self {
        Self(Table::new(Vec::new(), |row: &faqs::Model| row.id))
    }
}

#[async_trait]
impl FaqsRepo for MemoryFaqsRepo {
    async fn insert(&self, model: faqs::Model) -> Result<faqs::Model, DbErr> {
        Ok(self.0.insert(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<faqs::Model>, DbErr> {
        Ok(self.0.find(id))
    }

    async fn list(&self) -> Result<Vec<faqs::Model>, DbErr> {
        let mut rows = self.0.all();
        rows.reverse();
        Ok(rows)
    }

    async fn update(&self, model: faqs::Model) -> Result<faqs::Model, DbErr> {
        self.0.update(model)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        Ok(self.0.delete_where(|row| row.id != id))
    }
}

/// Records every call; destroy can be made to fail.
#[derive(Default)]
pub struct FakeAssetStore {
    uploaded: Mutex<Vec<String>>,
    destroyed: Mutex<Vec<String>>,
    fail_destroy: bool,
}

impl FakeAssetStore {
    pub fn failing_destroy() -> Self {
        Self {
            fail_destroy: true,
            ..Self::default()
        }
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    /// Destroy attempts, including failed ones.
    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for FakeAssetStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _content_type: &str,
        public_id: &str,
    ) -> Result<UploadedAsset, ApiError> {
        self.uploaded.lock().unwrap().push(public_id.to_string());
        Ok(UploadedAsset {
            url: format!("https://res.cloudinary.com/test/image/upload/v1/{public_id}.png"),
            public_id: public_id.to_string(),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ApiError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        if self.fail_destroy {
            return Err(ApiError::unexpected("asset store unavailable"));
        }
        Ok(())
    }
}

/// Maps credentials to profiles; anything else is an invalid token.
#[derive(Default)]
pub struct FakeIdentityVerifier {
    profiles: Mutex<HashMap<String, GoogleProfile>>,
}

impl FakeIdentityVerifier {
    pub fn register(&self, credential: &str, profile: GoogleProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(credential.to_string(), profile);
    }
}

#[async_trait]
impl IdentityVerifier for FakeIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleProfile, ApiError> {
        self.profiles
            .lock()
            .unwrap()
            .get(credential)
            .cloned()
            .ok_or_else(|| ApiError::authentication("invalid_google_token", "invalid Google token"))
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub users: Arc<MemoryUsersRepo>,
    pub products: Arc<MemoryProductsRepo>,
    pub assets: Arc<FakeAssetStore>,
    pub identity: Arc<FakeIdentityVerifier>,
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_assets(FakeAssetStore::default())
    }

    pub fn with_assets(assets: FakeAssetStore) -> Self {
        let users = Arc::new(MemoryUsersRepo::default());
        let products = Arc::new(MemoryProductsRepo::default());
        let assets = Arc::new(assets);
        let identity = Arc::new(FakeIdentityVerifier::default());
        let tokens = Arc::new(TokenService::new(b"test-secret"));

        let state = AppState::assemble(
            Arc::new(SeaOrmDatabaseClient::from_conn(
                DatabaseConnection::Disconnected,
            )),
            Arc::new(ConfigServiceImpl::from_config(Config::default())),
            tokens.clone(),
            Backends {
                users: users.clone(),
                products: products.clone(),
                leads: Arc::new(MemoryLeadsRepo::default()),
                faqs: Arc::new(MemoryFaqsRepo::default()),
                assets: assets.clone(),
                identity: identity.clone(),
            },
        );

        Self {
            state,
            users,
            products,
            assets,
            identity,
            tokens,
        }
    }

    /// Stores an account and returns it with a bearer header value.
    pub fn signed_in(&self, email: &str, role: Role) -> (users::Model, String) {
        let model = account(email, role);
        self.users.0.insert(model.clone());
        let token = self.tokens.issue(&model).unwrap();
        (model, format!("Bearer {token}"))
    }
}
