use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{parse_id, MessageResponse};
use crate::{
    entities::faqs::{self, Answer, AuthorSnapshot},
    error::{ApiError, ApiJson, ErrorResponse},
    middleware::auth::CurrentAccount,
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct QuestionRequest {
    pub question: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AnswerRequest {
    pub text: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaqResponse {
    pub id: Uuid,
    pub author: AuthorSnapshot,
    pub question: String,
    pub answers: Vec<Answer>,
    pub created_at: DateTime<Utc>,
}

impl From<faqs::Model> for FaqResponse {
    fn from(model: faqs::Model) -> Self {
        Self {
            id: model.id,
            author: model.author,
            question: model.question,
            answers: model.answers.0,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/faq",
    tag = "faq",
    responses(
        (status = 200, description = "Questions, newest first", body = [FaqResponse])
    )
)]
pub async fn list_faqs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FaqResponse>>, ApiError> {
    let faqs = state.faqs().list().await?;
    Ok(Json(faqs.into_iter().map(FaqResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/faq",
    tag = "faq",
    security(("bearer" = [])),
    request_body = QuestionRequest,
    responses(
        (status = 201, description = "Question posted", body = FaqResponse),
        (status = 400, description = "Empty question", body = ErrorResponse)
    )
)]
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    ApiJson(payload): ApiJson<QuestionRequest>,
) -> Result<(StatusCode, Json<FaqResponse>), ApiError> {
    let faq = state
        .faqs()
        .ask(&account, payload.question.as_deref().unwrap_or_default())
        .await?;
    Ok((StatusCode::CREATED, Json(faq.into())))
}

#[utoipa::path(
    post,
    path = "/api/faq/{id}/answers",
    tag = "faq",
    security(("bearer" = [])),
    request_body = AnswerRequest,
    params(
        ("id" = String, Path, description = "Question id")
    ),
    responses(
        (status = 201, description = "Answer appended", body = FaqResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    )
)]
pub async fn add_answer(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<AnswerRequest>,
) -> Result<(StatusCode, Json<FaqResponse>), ApiError> {
    let id = parse_id(&id)?;
    let faq = state
        .faqs()
        .answer(id, &account, payload.text.as_deref().unwrap_or_default())
        .await?;
    Ok((StatusCode::CREATED, Json(faq.into())))
}

#[utoipa::path(
    put,
    path = "/api/faq/{id}",
    tag = "faq",
    security(("bearer" = [])),
    request_body = QuestionRequest,
    params(
        ("id" = String, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Question edited", body = FaqResponse),
        (status = 403, description = "Neither author nor admin", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    )
)]
pub async fn edit_question(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<QuestionRequest>,
) -> Result<Json<FaqResponse>, ApiError> {
    let id = parse_id(&id)?;
    let faq = state
        .faqs()
        .edit_question(id, &account, payload.question.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(faq.into()))
}

#[utoipa::path(
    delete,
    path = "/api/faq/{id}",
    tag = "faq",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Question deleted", body = MessageResponse),
        (status = 403, description = "Neither author nor admin", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    )
)]
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.faqs().delete_question(parse_id(&id)?, &account).await?;
    Ok(Json(MessageResponse {
        message: "question deleted".to_string(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/faq/{id}/answers/{answer_id}",
    tag = "faq",
    security(("bearer" = [])),
    request_body = AnswerRequest,
    params(
        ("id" = String, Path, description = "Question id"),
        ("answer_id" = String, Path, description = "Answer id")
    ),
    responses(
        (status = 200, description = "Answer edited", body = FaqResponse),
        (status = 403, description = "Neither author nor admin", body = ErrorResponse),
        (status = 404, description = "Question or answer not found", body = ErrorResponse)
    )
)]
pub async fn edit_answer(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    Path((id, answer_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<AnswerRequest>,
) -> Result<Json<FaqResponse>, ApiError> {
    let (id, answer_id) = (parse_id(&id)?, parse_id(&answer_id)?);
    let faq = state
        .faqs()
        .edit_answer(
            id,
            answer_id,
            &account,
            payload.text.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(faq.into()))
}

#[utoipa::path(
    delete,
    path = "/api/faq/{id}/answers/{answer_id}",
    tag = "faq",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Question id"),
        ("answer_id" = String, Path, description = "Answer id")
    ),
    responses(
        (status = 200, description = "Answer removed", body = FaqResponse),
        (status = 403, description = "Neither author nor admin", body = ErrorResponse),
        (status = 404, description = "Question or answer not found", body = ErrorResponse)
    )
)]
pub async fn delete_answer(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    Path((id, answer_id)): Path<(String, String)>,
) -> Result<Json<FaqResponse>, ApiError> {
    let (id, answer_id) = (parse_id(&id)?, parse_id(&answer_id)?);
    let faq = state.faqs().delete_answer(id, answer_id, &account).await?;
    Ok(Json(faq.into()))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/faq", get(list_faqs).post(ask_question))
        .route("/api/faq/:id", put(edit_question).delete(delete_question))
        .route("/api/faq/:id/answers", post(add_answer))
        .route(
            "/api/faq/:id/answers/:answer_id",
            put(edit_answer).delete(delete_answer),
        )
        .with_state(state)
}
