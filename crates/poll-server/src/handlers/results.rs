//! Results handlers

use axum::{extract::State, Json};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use validator::Validate;

use poll_core::ResultsSnapshot;

use crate::extractors::{AdminUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Response for the public current-results endpoint
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CurrentResultsResponse {
    Snapshot(Box<ResultsSnapshot>),
    None { message: String },
}

/// Fetch the current vote snapshot for the active question
///
/// GET /api/results/current
pub async fn current(State(state): State<AppState>) -> ApiResult<Json<CurrentResultsResponse>> {
    let response = match state.store().get_current_results().await? {
        Some(tally) => {
            let count = state.registry().connection_count() as u64;
            CurrentResultsResponse::Snapshot(Box::new(tally.into_snapshot(count)))
        }
        None => CurrentResultsResponse::None {
            message: "No active question".to_string(),
        },
    };
    Ok(Json(response))
}

/// Pick-random-user request body
#[derive(Debug, Deserialize, Validate)]
pub struct PickRandomUserRequest {
    #[serde(rename = "questionId")]
    #[validate(length(min = 1, message = "question id required"))]
    pub question_id: String,
    #[validate(length(min = 1, message = "option required"))]
    pub option: String,
}

/// Pick-random-user response; `username` is null when nobody picked the
/// option
#[derive(Debug, Serialize)]
pub struct PickRandomUserResponse {
    pub username: Option<String>,
}

/// Draw a uniformly random nickname among the voters of one option
///
/// POST /api/results/pick-random-user
pub async fn pick_random_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<PickRandomUserRequest>,
) -> ApiResult<Json<PickRandomUserResponse>> {
    let answers = state
        .store()
        .answers_for_question(&request.question_id)
        .await?;

    let voters: Vec<&str> = answers
        .iter()
        .filter(|a| a.selected_answer == request.option)
        .map(|a| a.user_nickname.as_str())
        .collect();

    let username = voters
        .choose(&mut rand::thread_rng())
        .map(|nickname| (*nickname).to_string());

    Ok(Json(PickRandomUserResponse { username }))
}
