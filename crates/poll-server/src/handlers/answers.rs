//! Answer handlers
//!
//! Participants vote against the active question only. Case normalization
//! of the selection happens here, at the boundary; the record store accepts
//! exact option texts.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use poll_core::DomainError;

use crate::extractors::ValidatedJson;
use crate::handlers::schedule_current_results;
use crate::response::ApiResult;
use crate::state::AppState;

/// Submit-answer request body
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "user id required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "nickname required"))]
    pub user_nickname: String,
    #[validate(length(min = 1, message = "answer required"))]
    pub selected_answer: String,
}

/// Mutation acknowledgement body
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
}

/// Record a vote on the active question
///
/// POST /api/answers/submit
pub async fn submit(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SubmitAnswerRequest>,
) -> ApiResult<Json<AckResponse>> {
    let question = state
        .store()
        .get_active_question()
        .await?
        .ok_or(DomainError::NoActiveQuestion)?;

    if question.is_locked {
        return Err(DomainError::QuestionLocked.into());
    }

    let selected = question
        .resolve_option(&request.selected_answer)
        .ok_or_else(|| DomainError::InvalidAnswer {
            selected: request.selected_answer.clone(),
        })?
        .to_string();

    state
        .store()
        .submit_answer(&question.id, &request.user_id, &request.user_nickname, &selected)
        .await?;

    schedule_current_results(&state).await?;

    Ok(Json(AckResponse { success: true }))
}

/// Retract-answer request body
#[derive(Debug, Deserialize, Validate)]
pub struct RetractAnswerRequest {
    #[validate(length(min = 1, message = "user id required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "question id required"))]
    pub question_id: String,
}

/// Withdraw a vote; a no-op when none exists
///
/// POST /api/answers/retract
pub async fn retract(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RetractAnswerRequest>,
) -> ApiResult<Json<AckResponse>> {
    state
        .store()
        .retract_answer(&request.user_id, &request.question_id)
        .await?;

    schedule_current_results(&state).await?;

    Ok(Json(AckResponse { success: true }))
}
