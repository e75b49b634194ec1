//! Emoji reaction handler
//!
//! Reactions are fire-and-forget broadcasts on the auxiliary emoji channel;
//! nothing is stored. Full emoji validation is an external concern; this
//! boundary only rejects obviously bogus payloads.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::connection::EMOJI_CHANNEL;
use crate::events::PollEvent;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Longest plausible emoji cluster (ZWJ sequences, modifiers, flags)
const MAX_EMOJI_SCALARS: usize = 16;

/// Emoji submission body
#[derive(Debug, Deserialize)]
pub struct EmojiRequest {
    pub emoji: String,
}

/// Emoji submission acknowledgement
#[derive(Debug, Serialize)]
pub struct EmojiResponse {
    pub message: String,
}

/// Broadcast an audience emoji reaction
///
/// POST /api/emojis/submit
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<EmojiRequest>,
) -> ApiResult<Json<EmojiResponse>> {
    let emoji = request.emoji.trim();
    if emoji.is_empty() || emoji.chars().count() > MAX_EMOJI_SCALARS {
        return Err(ApiError::invalid_body(
            "Invalid emoji provided. Please provide a single emoji.",
        ));
    }

    state
        .registry()
        .send(PollEvent::Emoji, json!({ "emoji": emoji }), Some(EMOJI_CHANNEL));

    Ok(Json(EmojiResponse {
        message: "Emoji received and broadcasted.".to_string(),
    }))
}
