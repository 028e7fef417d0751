use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::users::{self, Provider, Role},
    error::{ApiError, ApiJson, ErrorResponse},
    middleware::auth::CurrentAccount,
    service::auth::Session,
    state::AppState,
};

/// Multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    /// The ID token returned by Google sign-in.
    pub credential: Option<String>,
}

/// Multipart body of the upload route, for the API document only.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ProfilePictureForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvatarRequest {
    pub avatar_url: Option<String>,
}

/// Public view of an account. Credentials never leave the service.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile_picture: String,
    pub provider: Provider,
    pub is_google_auth: bool,
    pub has_custom_avatar: bool,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(model: users::Model) -> Self {
        Self {
            profile_picture: model.display_picture(),
            is_google_auth: model.is_google(),
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            provider: model.provider,
            has_custom_avatar: model.has_custom_avatar,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new_user: Option<bool>,
}

impl SessionResponse {
    fn with_new_user_flag(session: Session) -> Self {
        Self {
            is_new_user: Some(session.is_new_user),
            ..Self::without_flag(session)
        }
    }

    fn without_flag(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.account.into(),
            is_new_user: None,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub public_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct AvatarResponse {
    pub success: bool,
    pub url: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Missing fields or domain not allowed", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state
        .auth()
        .register(
            payload.name.as_deref().unwrap_or_default(),
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::with_new_user_flag(session)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .auth()
        .login(
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(SessionResponse::without_flag(session)))
}

#[utoipa::path(
    post,
    path = "/api/auth/google",
    tag = "auth",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Signed in with Google", body = SessionResponse),
        (status = 401, description = "Google rejected the credential", body = ErrorResponse)
    )
)]
pub async fn google(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<GoogleLoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let credential = payload.credential.unwrap_or_default();
    if credential.trim().is_empty() {
        return Err(ApiError::validation(
            "missing_credential",
            "credential is required",
        ));
    }

    let session = state.auth().google_login(credential.trim()).await?;
    Ok(Json(SessionResponse::with_new_user_flag(session)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current account", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn me(CurrentAccount(account): CurrentAccount) -> Json<MeResponse> {
    Json(MeResponse {
        user: account.into(),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/upload-profile-picture",
    tag = "auth",
    security(("bearer" = [])),
    request_body(content = ProfilePictureForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Picture stored", body = UploadResponse),
        (status = 400, description = "Missing, oversized or non-image file", body = ErrorResponse)
    )
)]
pub async fn upload_profile_picture(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart =
        multipart.map_err(|err| ApiError::validation("no_file", err.body_text()))?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(upload_error)?;
        image = Some((bytes.to_vec(), content_type));
        break;
    }

    let (bytes, content_type) = image.unwrap_or_default();
    let updated = state
        .accounts()
        .upload_picture(account, bytes, &content_type)
        .await?;

    tracing::info!(account_id = %updated.id, "profile picture uploaded");
    Ok(Json(UploadResponse {
        success: true,
        url: updated.display_picture(),
        public_id: updated.asset_public_id.unwrap_or_default(),
    }))
}

fn upload_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::validation("file_too_large", "image exceeds the upload limit")
    } else {
        ApiError::validation("invalid_upload", err.body_text())
    }
}

#[utoipa::path(
    put,
    path = "/api/auth/update-avatar",
    tag = "auth",
    security(("bearer" = [])),
    request_body = UpdateAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Missing avatarUrl", body = ErrorResponse)
    )
)]
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    ApiJson(payload): ApiJson<UpdateAvatarRequest>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let updated = state
        .accounts()
        .set_preset_avatar(account, payload.avatar_url.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(AvatarResponse {
        success: true,
        url: updated.display_picture(),
        message: "avatar updated".to_string(),
    }))
}

/// Body limit for the multipart route: the file cap plus room for the form framing.
fn upload_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_add(MULTIPART_OVERHEAD)
}

pub fn routes(state: Arc<AppState>) -> Router {
    let upload_limit = upload_limit(state.config().values().max_upload_bytes);

    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/google", post(google))
        .route("/api/auth/me", get(me))
        .route(
            "/api/auth/upload-profile-picture",
            post(upload_profile_picture).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/auth/update-avatar", put(update_avatar))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_limit_adds_framing_and_saturates() {
        assert_eq!(upload_limit(5 * 1024 * 1024), 5 * 1024 * 1024 + MULTIPART_OVERHEAD);
        assert_eq!(upload_limit(usize::MAX), usize::MAX);
        assert_eq!(upload_limit(usize::MAX - 1), usize::MAX);
    }
}
