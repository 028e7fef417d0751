use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use std::{sync::Arc, time::Instant};

use crate::{
    repo::{
        faqs::{FaqsRepo, SeaOrmFaqsRepo},
        leads::{LeadsRepo, SeaOrmLeadsRepo},
        products::{ProductsRepo, SeaOrmProductsRepo},
        users::{SeaOrmUsersRepo, UsersRepo},
    },
    service::{
        accounts::{AccountsService, AccountsServiceImpl},
        assets::{AssetStore, CloudinaryAssetStore, UnconfiguredAssetStore},
        auth::{AuthService, AuthServiceImpl},
        config::ConfigService,
        faqs::{FaqService, FaqServiceImpl},
        google::{GoogleIdentityVerifier, IdentityVerifier},
        leads::{LeadsService, LeadsServiceImpl},
        products::{ProductsService, ProductsServiceImpl},
        tokens::TokenService,
    },
};

#[async_trait]
pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;

    async fn is_connected(&self) -> bool {
        self.conn().ping().await.is_ok()
    }
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    /// Connects using `DATABASE_URL` and brings the schema up to date.
    pub async fn connect() -> Result<Self, DbErr> {
        let conn = crate::db::connect().await?;
        crate::schema::apply(&conn).await?;
        Ok(Self { conn })
    }

    pub fn from_conn(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Storage and third-party collaborators the services are built from.
pub struct Backends {
    pub users: Arc<dyn UsersRepo>,
    pub products: Arc<dyn ProductsRepo>,
    pub leads: Arc<dyn LeadsRepo>,
    pub faqs: Arc<dyn FaqsRepo>,
    pub assets: Arc<dyn AssetStore>,
    pub identity: Arc<dyn IdentityVerifier>,
}

pub struct AppState {
    db: Arc<dyn DatabaseClient>,
    auth: Arc<dyn AuthService>,
    accounts: Arc<dyn AccountsService>,
    products: Arc<dyn ProductsService>,
    leads: Arc<dyn LeadsService>,
    faqs: Arc<dyn FaqService>,
    config: Arc<dyn ConfigService>,
    started_at: Instant,
}

impl AppState {
    pub fn new(db: Arc<dyn DatabaseClient>, config: Arc<dyn ConfigService>) -> Arc<Self> {
        let http = reqwest::Client::new();
        let values = config.values();

        let assets: Arc<dyn AssetStore> =
            match CloudinaryAssetStore::from_config(http.clone(), values) {
                Some(store) => Arc::new(store),
                None => {
                    tracing::warn!("CLOUDINARY_* not fully configured; image uploads will fail");
                    Arc::new(UnconfiguredAssetStore)
                }
            };
        if values.google_client_id.is_none() {
            tracing::warn!("AUTH_GOOGLE_CLIENT_ID is not set; google sign-in is disabled");
        }
        let identity = Arc::new(GoogleIdentityVerifier::new(
            http,
            values.google_tokeninfo_url.clone(),
            values.google_client_id.clone(),
        ));

        let backends = Backends {
            users: Arc::new(SeaOrmUsersRepo::new(db.clone())),
            products: Arc::new(SeaOrmProductsRepo::new(db.clone())),
            leads: Arc::new(SeaOrmLeadsRepo::new(db.clone())),
            faqs: Arc::new(SeaOrmFaqsRepo::new(db.clone())),
            assets,
            identity,
        };
        let tokens = Arc::new(TokenService::from_secret(values.jwt_secret.as_deref()));
        Self::assemble(db, config, tokens, backends)
    }

    pub fn assemble(
        db: Arc<dyn DatabaseClient>,
        config: Arc<dyn ConfigService>,
        tokens: Arc<TokenService>,
        backends: Backends,
    ) -> Arc<Self> {
        let auth = Arc::new(AuthServiceImpl::new(
            backends.users.clone(),
            tokens,
            backends.identity,
            config.clone(),
        ));
        let accounts = Arc::new(AccountsServiceImpl::new(
            backends.users,
            backends.assets.clone(),
            config.clone(),
        ));
        let products = Arc::new(ProductsServiceImpl::new(backends.products, backends.assets));
        let leads = Arc::new(LeadsServiceImpl::new(backends.leads));
        let faqs = Arc::new(FaqServiceImpl::new(backends.faqs));

        Arc::new(Self {
            db,
            auth,
            accounts,
            products,
            leads,
            faqs,
            config,
            started_at: Instant::now(),
        })
    }

    pub fn db(&self) -> &dyn DatabaseClient {
        self.db.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthService {
        self.auth.as_ref()
    }

    pub fn accounts(&self) -> &dyn AccountsService {
        self.accounts.as_ref()
    }

    pub fn products(&self) -> &dyn ProductsService {
        self.products.as_ref()
    }

    pub fn leads(&self) -> &dyn LeadsService {
        self.leads.as_ref()
    }

    pub fn faqs(&self) -> &dyn FaqService {
        self.faqs.as_ref()
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.config.as_ref()
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
