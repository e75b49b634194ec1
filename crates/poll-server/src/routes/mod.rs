//! Route definitions
//!
//! HTTP endpoints are mounted under /api; the WebSocket duplex endpoint and
//! the health probe live at the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{answers, auth, connections, emojis, health, questions, results};
use crate::state::AppState;
use crate::ws;

/// Create the main router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(ws::ws_handler))
        .nest("/api", api_routes())
}

/// API routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(question_routes())
        .merge(answer_routes())
        .merge(result_routes())
        .merge(connection_routes())
        .merge(emoji_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", get(auth::verify))
}

/// Question routes
fn question_routes() -> Router<AppState> {
    Router::new()
        .route("/questions", get(questions::list).post(questions::create))
        .route("/questions/active", get(questions::active))
        .route("/questions/publish", post(questions::publish))
        .route("/questions/toggle-lock", post(questions::toggle_lock))
}

/// Answer routes
fn answer_routes() -> Router<AppState> {
    Router::new()
        .route("/answers/submit", post(answers::submit))
        .route("/answers/retract", post(answers::retract))
}

/// Results routes
fn result_routes() -> Router<AppState> {
    Router::new()
        .route("/results/current", get(results::current))
        .route("/results/pick-random-user", post(results::pick_random_user))
}

/// Connection listing routes
fn connection_routes() -> Router<AppState> {
    Router::new().route("/websockets/connections", get(connections::list))
}

/// Emoji routes
fn emoji_routes() -> Router<AppState> {
    Router::new().route("/emojis/submit", post(emojis::submit))
}
