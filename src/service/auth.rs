use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::users::{self, Provider, Role},
    error::ApiError,
    repo::users::UsersRepo,
    service::{
        config::ConfigService,
        google::IdentityVerifier,
        passwords::{hash_password, verify_password},
        tokens::TokenService,
    },
};

#[derive(Debug)]
pub struct Session {
    pub account: users::Model,
    pub token: String,
    pub is_new_user: bool,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, name: &str, email: &str, password: &str)
        -> Result<Session, ApiError>;
    async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError>;
    async fn google_login(&self, credential: &str) -> Result<Session, ApiError>;
    /// Resolves a bearer token to the live account it was issued for.
    async fn authenticate(&self, token: &str) -> Result<users::Model, ApiError>;
}

pub struct AuthServiceImpl {
    users: Arc<dyn UsersRepo>,
    tokens: Arc<TokenService>,
    identity: Arc<dyn IdentityVerifier>,
    config: Arc<dyn ConfigService>,
}

pub(crate) fn normalize_email(email: &str) -> Result<String, ApiError> {
    let value = email.trim().to_lowercase();
    if value.is_empty() || !value.contains('@') {
        return Err(ApiError::validation("invalid_email", "invalid email"));
    }
    Ok(value)
}

pub(crate) fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("missing_fields", message));
    }
    Ok(trimmed)
}

pub(crate) fn new_local_account(
    name: &str,
    email: String,
    password_hash: String,
    role: Role,
) -> users::Model {
    let now = Utc::now().into();
    users::Model {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email,
        password_hash: Some(password_hash),
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

impl AuthServiceImpl {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        tokens: Arc<TokenService>,
        identity: Arc<dyn IdentityVerifier>,
        config: Arc<dyn ConfigService>,
    ) -> Self {
        Self {
            users,
            tokens,
            identity,
            config,
        }
    }

    fn ensure_domain_allowed(&self, email: &str) -> Result<(), ApiError> {
        let config = self.config.values();
        if config.email_domain_allowed(email) {
            return Ok(());
        }
        Err(ApiError::validation(
            "email_domain_not_allowed",
            format!(
                "only {} addresses are accepted",
                config
                    .allowed_email_domains
                    .iter()
                    .map(|domain| format!("@{domain}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ))
    }

    fn session(&self, account: users::Model, is_new_user: bool) -> Result<Session, ApiError> {
        let token = self.tokens.issue(&account)?;
        Ok(Session {
            account,
            token,
            is_new_user,
        })
    }

    fn invalid_credentials() -> ApiError {
        ApiError::authentication("invalid_credentials", "invalid email or password")
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let message = "name, email and password are required";
        let name = required(name, message)?;
        required(email, message)?;
        if password.is_empty() {
            return Err(ApiError::validation("missing_fields", message));
        }
        let email = normalize_email(email)?;
        self.ensure_domain_allowed(&email)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::conflict("email_taken", "email already registered"));
        }

        let password_hash = hash_password(password)?;
        let account = self
            .users
            .insert(new_local_account(name, email, password_hash, Role::User))
            .await?;
        tracing::info!(account_id = %account.id, "registered local account");

        self.session(account, true)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::validation(
                "missing_fields",
                "email and password are required",
            ));
        }
        let email = email.trim().to_lowercase();

        let Some(account) = self.users.find_by_email(&email).await? else {
            return Err(Self::invalid_credentials());
        };

        if account.is_google() {
            return Err(ApiError::authentication(
                "google_account",
                "this account uses Google sign-in, please continue with Google",
            ));
        }

        let Some(hash) = account.password_hash.as_deref() else {
            return Err(Self::invalid_credentials());
        };
        if !verify_password(hash, password) {
            return Err(Self::invalid_credentials());
        }

        self.session(account, false)
    }

    async fn google_login(&self, credential: &str) -> Result<Session, ApiError> {
        let credential = required(credential, "credential is required")?;
        let profile = self.identity.verify(credential).await?;
        self.ensure_domain_allowed(&profile.email)?;

        let Some(mut account) = self.users.find_by_email(&profile.email).await? else {
            let now = Utc::now().into();
            let account = self
                .users
                .insert(users::Model {
                    id: Uuid::new_v4(),
                    name: profile.name,
                    email: profile.email,
                    password_hash: None,
                    role: Role::User,
                    google_id: Some(profile.subject),
                    profile_picture: profile.picture,
                    asset_public_id: None,
                    provider: Provider::Google,
                    has_custom_avatar: false,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            tracing::info!(account_id = %account.id, "created google account");
            return self.session(account, true);
        };

        match account.provider {
            Provider::Local => {
                account
                    .migrate_to_google(profile.subject, profile.picture)
                    .map_err(|err| ApiError::unexpected(err.to_string()))?;
                account = self.users.update(account).await?;
                tracing::info!(account_id = %account.id, "migrated local account to google");
            }
            Provider::Google => {
                if !account.has_custom_avatar && account.profile_picture != profile.picture {
                    account.profile_picture = profile.picture;
                    account = self.users.update(account).await?;
                }
            }
        }

        self.session(account, false)
    }

    async fn authenticate(&self, token: &str) -> Result<users::Model, ApiError> {
        let claims = self.tokens.verify(token)?;
        self.users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::not_found("account_not_found", "account not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        service::{config::ConfigServiceImpl, google::GoogleProfile},
        testing::{FakeIdentityVerifier, MemoryUsersRepo},
    };
    use axum::http::StatusCode;

    struct Fixture {
        users: Arc<MemoryUsersRepo>,
        identity: Arc<FakeIdentityVerifier>,
        auth: AuthServiceImpl,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUsersRepo::default());
        let identity = Arc::new(FakeIdentityVerifier::default());
        let auth = AuthServiceImpl::new(
            users.clone(),
            Arc::new(TokenService::new(b"test-secret")),
            identity.clone(),
            Arc::new(ConfigServiceImpl::from_config(Config::default())),
        );
        Fixture {
            users,
            identity,
            auth,
        }
    }

    fn google_profile(subject: &str, email: &str) -> GoogleProfile {
        GoogleProfile {
            subject: subject.to_string(),
            email: email.to_string(),
            name: "Ana".to_string(),
            picture: Some(format!("https://lh3.test/{subject}")),
        }
    }

    #[tokio::test]
    async fn register_creates_local_account_with_verifiable_hash() {
        let f = fixture();

        let session = f
            .auth
            .register("Ana", " Ana@Gmail.com ", "hunter22")
            .await
            .unwrap();

        assert!(session.is_new_user);
        assert_eq!(session.account.email, "ana@gmail.com");
        assert_eq!(session.account.provider, Provider::Local);
        assert_eq!(session.account.role, Role::User);
        assert!(!session.account.has_custom_avatar);
        let hash = session.account.password_hash.as_deref().unwrap();
        assert!(verify_password(hash, "hunter22"));

        let resolved = f.auth.authenticate(&session.token).await.unwrap();
        assert_eq!(resolved.id, session.account.id);
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_foreign_domains() {
        let f = fixture();
        f.auth.register("Ana", "ana@gmail.com", "pw").await.unwrap();

        let dup = f
            .auth
            .register("Ana", "ana@gmail.com", "pw")
            .await
            .unwrap_err();
        assert_eq!(dup.status(), StatusCode::CONFLICT);

        let foreign = f
            .auth
            .register("Bob", "bob@yahoo.com", "pw")
            .await
            .unwrap_err();
        assert_eq!(foreign.status(), StatusCode::BAD_REQUEST);

        let blank = f.auth.register("  ", "c@gmail.com", "pw").await.unwrap_err();
        assert_eq!(blank.code(), "missing_fields");
        assert_eq!(f.users.all().len(), 1);
    }

    #[tokio::test]
    async fn login_does_not_reveal_which_field_was_wrong() {
        let f = fixture();
        f.auth
            .register("Ana", "ana@gmail.com", "right-pw")
            .await
            .unwrap();

        let session = f.auth.login("ana@gmail.com", "right-pw").await.unwrap();
        assert!(!session.is_new_user);

        let wrong_password = f.auth.login("ana@gmail.com", "wrong").await.unwrap_err();
        let unknown_email = f.auth.login("nobody@gmail.com", "right-pw").await.unwrap_err();
        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.code(), unknown_email.code());
    }

    #[tokio::test]
    async fn google_accounts_cannot_use_password_login() {
        let f = fixture();
        f.identity
            .register("cred-1", google_profile("g-1", "ana@gmail.com"));
        f.auth.google_login("cred-1").await.unwrap();

        let err = f.auth.login("ana@gmail.com", "anything").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "google_account");
    }

    #[tokio::test]
    async fn repeated_google_login_reuses_the_account() {
        let f = fixture();
        f.identity
            .register("cred-1", google_profile("g-1", "ana@gmail.com"));

        let first = f.auth.google_login("cred-1").await.unwrap();
        let second = f.auth.google_login("cred-1").await.unwrap();

        assert!(first.is_new_user);
        assert!(!second.is_new_user);
        assert_eq!(first.account.id, second.account.id);
        assert_eq!(first.account.provider, Provider::Google);
        assert_eq!(f.users.all().len(), 1);
    }

    #[tokio::test]
    async fn google_login_migrates_local_account_in_place() {
        let f = fixture();
        let registered = f
            .auth
            .register("Ana", "ana@gmail.com", "pw")
            .await
            .unwrap();
        f.identity
            .register("cred-1", google_profile("g-1", "ana@gmail.com"));

        let session = f.auth.google_login("cred-1").await.unwrap();

        assert!(!session.is_new_user);
        assert_eq!(session.account.id, registered.account.id);
        assert_eq!(session.account.provider, Provider::Google);
        assert_eq!(session.account.google_id.as_deref(), Some("g-1"));
        assert_eq!(
            session.account.profile_picture.as_deref(),
            Some("https://lh3.test/g-1")
        );
        assert_eq!(f.users.all()[0].provider, Provider::Google);
    }

    #[tokio::test]
    async fn google_login_keeps_custom_avatar() {
        let f = fixture();
        f.identity
            .register("cred-1", google_profile("g-1", "ana@gmail.com"));
        let first = f.auth.google_login("cred-1").await.unwrap();

        let mut account = first.account;
        account.profile_picture = Some("https://cdn.test/custom.png".to_string());
        account.has_custom_avatar = true;
        f.users.update(account).await.unwrap();

        let second = f.auth.google_login("cred-1").await.unwrap();
        assert_eq!(
            second.account.profile_picture.as_deref(),
            Some("https://cdn.test/custom.png")
        );
    }

    #[tokio::test]
    async fn google_login_enforces_domain_allow_list() {
        let f = fixture();
        f.identity
            .register("cred-1", google_profile("g-1", "ana@company.io"));

        let err = f.auth.google_login("cred-1").await.unwrap_err();
        assert_eq!(err.code(), "email_domain_not_allowed");
        assert!(f.users.all().is_empty());
    }

    #[tokio::test]
    async fn token_for_deleted_account_is_not_found() {
        let f = fixture();
        let session = f
            .auth
            .register("Ana", "ana@gmail.com", "pw")
            .await
            .unwrap();
        f.users.delete(session.account.id).await.unwrap();

        let err = f.auth.authenticate(&session.token).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = f.auth.authenticate("garbage").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
