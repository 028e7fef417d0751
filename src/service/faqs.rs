use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::{
        faqs::{self, Answer, AnswerList, AuthorSnapshot},
        users,
    },
    error::ApiError,
    repo::faqs::FaqsRepo,
};

#[async_trait]
pub trait FaqService: Send + Sync {
    async fn list(&self) -> Result<Vec<faqs::Model>, ApiError>;
    async fn ask(&self, author: &users::Model, question: &str) -> Result<faqs::Model, ApiError>;
    async fn answer(
        &self,
        id: Uuid,
        author: &users::Model,
        text: &str,
    ) -> Result<faqs::Model, ApiError>;
    async fn edit_question(
        &self,
        id: Uuid,
        caller: &users::Model,
        question: &str,
    ) -> Result<faqs::Model, ApiError>;
    async fn edit_answer(
        &self,
        id: Uuid,
        answer_id: Uuid,
        caller: &users::Model,
        text: &str,
    ) -> Result<faqs::Model, ApiError>;
    async fn delete_question(&self, id: Uuid, caller: &users::Model) -> Result<(), ApiError>;
    async fn delete_answer(
        &self,
        id: Uuid,
        answer_id: Uuid,
        caller: &users::Model,
    ) -> Result<faqs::Model, ApiError>;
}

pub struct FaqServiceImpl {
    faqs: Arc<dyn FaqsRepo>,
}

fn question_not_found() -> ApiError {
    ApiError::not_found("question_not_found", "question not found")
}

fn answer_not_found() -> ApiError {
    ApiError::not_found("answer_not_found", "answer not found")
}

/// Only the snapshotted author or an admin may change a post.
fn ensure_can_modify(author: &AuthorSnapshot, caller: &users::Model) -> Result<(), ApiError> {
    if author.id == caller.id || caller.is_admin() {
        return Ok(());
    }
    Err(ApiError::forbidden(
        "not_author",
        "only the author or an admin can change this post",
    ))
}

fn non_empty(text: &str, message: &str) -> Result<String, ApiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("empty_text", message));
    }
    Ok(trimmed.to_string())
}

impl FaqServiceImpl {
    pub fn new(faqs: Arc<dyn FaqsRepo>) -> Self {
        Self { faqs }
    }

    async fn load(&self, id: Uuid) -> Result<faqs::Model, ApiError> {
        self.faqs.find_by_id(id).await?.ok_or_else(question_not_found)
    }
}

#[async_trait]
impl FaqService for FaqServiceImpl {
    async fn list(&self) -> Result<Vec<faqs::Model>, ApiError> {
        Ok(self.faqs.list().await?)
    }

    async fn ask(&self, author: &users::Model, question: &str) -> Result<faqs::Model, ApiError> {
        let question = non_empty(question, "question cannot be empty")?;
        let faq = self
            .faqs
            .insert(faqs::Model {
                id: Uuid::new_v4(),
                author: AuthorSnapshot::from(author),
                question,
                answers: AnswerList::default(),
                created_at: Utc::now().into(),
            })
            .await?;
        tracing::info!(faq_id = %faq.id, author_id = %author.id, "question posted");
        Ok(faq)
    }

    async fn answer(
        &self,
        id: Uuid,
        author: &users::Model,
        text: &str,
    ) -> Result<faqs::Model, ApiError> {
        let mut faq = self.load(id).await?;
        let text = non_empty(text, "answer cannot be empty")?;

        faq.answers.0.push(Answer {
            id: Uuid::new_v4(),
            author: AuthorSnapshot::from(author),
            text,
            created_at: Utc::now(),
        });
        Ok(self.faqs.update(faq).await?)
    }

    async fn edit_question(
        &self,
        id: Uuid,
        caller: &users::Model,
        question: &str,
    ) -> Result<faqs::Model, ApiError> {
        let mut faq = self.load(id).await?;
        ensure_can_modify(&faq.author, caller)?;
        faq.question = non_empty(question, "question cannot be empty")?;
        Ok(self.faqs.update(faq).await?)
    }

    async fn edit_answer(
        &self,
        id: Uuid,
        answer_id: Uuid,
        caller: &users::Model,
        text: &str,
    ) -> Result<faqs::Model, ApiError> {
        let mut faq = self.load(id).await?;
        let answer = faq.answer_mut(answer_id).ok_or_else(answer_not_found)?;
        ensure_can_modify(&answer.author, caller)?;
        answer.text = non_empty(text, "answer cannot be empty")?;
        Ok(self.faqs.update(faq).await?)
    }

    async fn delete_question(&self, id: Uuid, caller: &users::Model) -> Result<(), ApiError> {
        let faq = self.load(id).await?;
        ensure_can_modify(&faq.author, caller)?;
        self.faqs.delete(id).await?;
        tracing::info!(faq_id = %id, by = %caller.id, "question deleted");
        Ok(())
    }

    async fn delete_answer(
        &self,
        id: Uuid,
        answer_id: Uuid,
        caller: &users::Model,
    ) -> Result<faqs::Model, ApiError> {
        let mut faq = self.load(id).await?;
        let answer = faq.answer(answer_id).ok_or_else(answer_not_found)?;
        ensure_can_modify(&answer.author, caller)?;
        faq.answers.0.retain(|answer| answer.id != answer_id);
        Ok(self.faqs.update(faq).await?)
    }
}
