//! Question handlers
//!
//! Creation, listing, publishing, and locking are admin-gated; the active
//! question is public (in its audience view).

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use poll_core::entities::{AnswerOption, AudienceQuestion, Question};

use crate::events::PollEvent;
use crate::extractors::{AdminUser, ValidatedJson};
use crate::handlers::schedule_current_results;
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// One answer option in a create request
#[derive(Debug, Deserialize, Serialize)]
pub struct AnswerOptionBody {
    pub text: String,
    pub emoji: Option<String>,
}

impl From<AnswerOptionBody> for AnswerOption {
    fn from(body: AnswerOptionBody) -> Self {
        Self {
            text: body.text,
            emoji: body.emoji,
        }
    }
}

/// Create-question request body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, message = "question text required"))]
    pub question_text: String,
    #[validate(length(min = 2, message = "at least 2 answer options required"))]
    pub answer_options: Vec<AnswerOptionBody>,
    pub note: Option<String>,
}

/// Create a new question
///
/// POST /api/questions
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<CreateQuestionRequest>,
) -> ApiResult<Created<Json<Question>>> {
    let options = request.answer_options.into_iter().map(Into::into).collect();
    let question = state
        .store()
        .create_question(&request.question_text, options, request.note)
        .await?;

    Ok(Created(Json(question)))
}

/// List every question, presenter fields included
///
/// GET /api/questions
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<Question>>> {
    Ok(Json(state.store().list_questions().await?))
}

/// Response for the public active-question endpoint
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActiveQuestionResponse {
    Active(AudienceQuestion),
    None { message: String },
}

/// Fetch the active question in its audience view
///
/// GET /api/questions/active
pub async fn active(State(state): State<AppState>) -> ApiResult<Json<ActiveQuestionResponse>> {
    let response = match state.store().get_active_question().await? {
        Some(question) => ActiveQuestionResponse::Active(AudienceQuestion::from(&question)),
        None => ActiveQuestionResponse::None {
            message: "No active question".to_string(),
        },
    };
    Ok(Json(response))
}

/// Publish request body
#[derive(Debug, Deserialize, Validate)]
pub struct PublishQuestionRequest {
    #[serde(rename = "questionId")]
    #[validate(length(min = 1, message = "question id required"))]
    pub question_id: String,
}

/// Publish a question: make it the single active one and clear all answers
///
/// POST /api/questions/publish
pub async fn publish(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<PublishQuestionRequest>,
) -> ApiResult<Json<Question>> {
    let question = state.store().publish_question(&request.question_id).await?;

    // The new question goes out immediately; the cleared tally follows the
    // coalesced path so late joiners and voters converge on the same view.
    state.registry().send(
        PollEvent::NewQuestion,
        json!(AudienceQuestion::from(&question)),
        None,
    );
    schedule_current_results(&state).await?;

    Ok(Json(question))
}

/// Toggle-lock request body
#[derive(Debug, Deserialize, Validate)]
pub struct ToggleLockRequest {
    #[serde(rename = "questionId")]
    #[validate(length(min = 1, message = "question id required"))]
    pub question_id: String,
}

/// Flip a question's lock flag and announce the change
///
/// POST /api/questions/toggle-lock
pub async fn toggle_lock(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<ToggleLockRequest>,
) -> ApiResult<Json<Question>> {
    let question = state
        .store()
        .toggle_question_lock(&request.question_id)
        .await?;

    state.registry().send(
        PollEvent::LockStatus,
        json!({
            "questionId": question.id,
            "is_locked": question.is_locked,
        }),
        None,
    );

    Ok(Json(question))
}
