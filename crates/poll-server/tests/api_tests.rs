//! Handler-level tests for the polling API
//!
//! These exercise the real handler functions against a file-backed store,
//! live connection registry, and coalescing scheduler: everything short of
//! the HTTP transport itself.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tempfile::TempDir;
use tokio::sync::mpsc;

use poll_common::{
    AdminConfig, AppConfig, AppSettings, BroadcastConfig, CorsConfig, DataConfig, Environment,
    JwtConfig, ServerConfig,
};
use poll_server::connection::Peer;
use poll_server::events::Envelope;
use poll_server::extractors::{AdminUser, ValidatedJson};
use poll_server::handlers::{answers, auth, connections, emojis, questions, results};
use poll_server::server::create_app_state;
use poll_server::state::AppState;

const DEBOUNCE_MS: u64 = 30;

fn test_config(dir: &TempDir) -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "poll-server-test".to_string(),
            env: Environment::Development,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        data: DataConfig {
            dir: dir.path().to_path_buf(),
        },
        jwt: JwtConfig {
            secret: "test-secret-key-that-is-long-enough".to_string(),
            token_expiry: 3600,
        },
        admin: AdminConfig {
            username: "admin".to_string(),
            password: "123".to_string(),
        },
        broadcast: BroadcastConfig {
            results_debounce_ms: DEBOUNCE_MS,
        },
        cors: CorsConfig::default(),
    }
}

async fn test_state(dir: &TempDir) -> AppState {
    create_app_state(test_config(dir))
        .await
        .expect("state should initialize")
}

fn admin() -> AdminUser {
    AdminUser {
        username: "admin".to_string(),
    }
}

/// Attach a listening peer to the registry and drain the open broadcast
async fn attach_peer(state: &AppState, channel: &str) -> mpsc::Receiver<String> {
    let (tx, mut rx) = mpsc::channel(32);
    let peer = Peer::new(Peer::generate_id(), "/ws", channel, None, tx);
    state.registry().open(peer).await;
    while rx.try_recv().is_ok() {}
    rx
}

async fn create_and_publish(state: &AppState, text: &str, option_texts: &[&str]) -> String {
    let request = questions::CreateQuestionRequest {
        question_text: text.to_string(),
        answer_options: option_texts
            .iter()
            .map(|t| questions::AnswerOptionBody {
                text: (*t).to_string(),
                emoji: None,
            })
            .collect(),
        note: None,
    };
    let created = questions::create(State(state.clone()), admin(), ValidatedJson(request))
        .await
        .unwrap();
    let id = created.0 .0.id.clone();

    questions::publish(
        State(state.clone()),
        admin(),
        ValidatedJson(questions::PublishQuestionRequest {
            question_id: id.clone(),
        }),
    )
    .await
    .unwrap();

    id
}

fn submit_request(user: &str, selected: &str) -> answers::SubmitAnswerRequest {
    answers::SubmitAnswerRequest {
        user_id: user.to_string(),
        user_nickname: format!("nick-{user}"),
        selected_answer: selected.to_string(),
    }
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_issues_verifiable_token() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let response = auth::login(
        State(state.clone()),
        ValidatedJson(auth::LoginRequest {
            username: "admin".to_string(),
            password: "123".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(response.0.token_type, "Bearer");
    let claims = state
        .jwt_service()
        .validate_admin_token(&response.0.token)
        .unwrap();
    assert_eq!(claims.sub, "admin");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let err = auth::login(
        State(state),
        ValidatedJson(auth::LoginRequest {
            username: "admin".to_string(),
            password: "wrong".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Voting flow
// ============================================================================

#[tokio::test]
async fn test_publish_broadcasts_audience_view() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let mut rx = attach_peer(&state, "default").await;

    create_and_publish(&state, "Tabs or spaces?", &["Tabs", "Spaces"]).await;

    let envelope: Envelope = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(envelope.event, "new-question");
    assert_eq!(envelope.data["question_text"], "Tabs or spaces?");
    // audience view: options flattened to texts, no presenter note
    assert_eq!(envelope.data["answer_options"][0], "Tabs");
    assert!(envelope.data.get("note").is_none());
}

#[tokio::test]
async fn test_submit_normalizes_case_at_the_boundary() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let id = create_and_publish(&state, "Pick?", &["Alpha", "Beta"]).await;

    answers::submit(State(state.clone()), ValidatedJson(submit_request("u1", "ALPHA")))
        .await
        .unwrap();

    let tally = state
        .store()
        .get_results_for_question(&id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tally.results["Alpha"], 1, "canonical option text wins");
}

#[tokio::test]
async fn test_submit_requires_active_question() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let err = answers::submit(State(state), ValidatedJson(submit_request("u1", "A")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_rejects_locked_question() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let id = create_and_publish(&state, "Pick?", &["A", "B"]).await;
    questions::toggle_lock(
        State(state.clone()),
        admin(),
        ValidatedJson(questions::ToggleLockRequest { question_id: id }),
    )
    .await
    .unwrap();

    let err = answers::submit(State(state), ValidatedJson(submit_request("u1", "A")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_submit_rejects_undeclared_option() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    create_and_publish(&state, "Pick?", &["A", "B"]).await;

    let err = answers::submit(State(state), ValidatedJson(submit_request("u1", "C")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vote_burst_coalesces_into_one_broadcast() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let mut rx = attach_peer(&state, "default").await;

    create_and_publish(&state, "A or B?", &["A", "B"]).await;
    // drain new-question
    let _ = rx.recv().await;

    answers::submit(State(state.clone()), ValidatedJson(submit_request("u1", "A")))
        .await
        .unwrap();
    answers::submit(State(state.clone()), ValidatedJson(submit_request("u2", "B")))
        .await
        .unwrap();
    answers::submit(State(state.clone()), ValidatedJson(submit_request("u1", "B")))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 4)).await;

    let envelope: Envelope = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(envelope.event, "results-update");
    assert_eq!(envelope.data["results"]["A"], 0);
    assert_eq!(envelope.data["results"]["B"], 2);
    assert_eq!(envelope.data["totalVotes"], 2);
    assert_eq!(envelope.data["totalConnections"], 1);

    // the publish-time empty snapshot was superseded inside the window;
    // the burst produced exactly one frame
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_retract_is_idempotent_through_the_api() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let id = create_and_publish(&state, "Pick?", &["A", "B"]).await;
    answers::submit(State(state.clone()), ValidatedJson(submit_request("u1", "A")))
        .await
        .unwrap();

    let request = answers::RetractAnswerRequest {
        user_id: "u1".to_string(),
        question_id: id.clone(),
    };
    answers::retract(
        State(state.clone()),
        ValidatedJson(answers::RetractAnswerRequest {
            user_id: request.user_id.clone(),
            question_id: request.question_id.clone(),
        }),
    )
    .await
    .unwrap();
    answers::retract(State(state.clone()), ValidatedJson(request))
        .await
        .unwrap();

    let tally = state
        .store()
        .get_results_for_question(&id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tally.total_votes, 0);
}

// ============================================================================
// Results
// ============================================================================

#[tokio::test]
async fn test_current_results_without_active_question() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let response = results::current(State(state)).await.unwrap();
    match response.0 {
        results::CurrentResultsResponse::None { message } => {
            assert_eq!(message, "No active question");
        }
        results::CurrentResultsResponse::Snapshot(_) => panic!("expected no snapshot"),
    }
}

#[tokio::test]
async fn test_pick_random_user() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let id = create_and_publish(&state, "Pick?", &["A", "B"]).await;
    answers::submit(State(state.clone()), ValidatedJson(submit_request("u1", "A")))
        .await
        .unwrap();

    let picked = results::pick_random_user(
        State(state.clone()),
        admin(),
        ValidatedJson(results::PickRandomUserRequest {
            question_id: id.clone(),
            option: "A".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(picked.0.username.as_deref(), Some("nick-u1"));

    let empty = results::pick_random_user(
        State(state),
        admin(),
        ValidatedJson(results::PickRandomUserRequest {
            question_id: id,
            option: "B".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(empty.0.username.is_none());
}

// ============================================================================
// Connections & emojis
// ============================================================================

#[tokio::test]
async fn test_connections_listing_tracks_registry() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let _rx = attach_peer(&state, "default").await;

    let listed = connections::list(
        State(state.clone()),
        admin(),
        Query(connections::ConnectionsQuery { channel: None }),
    )
    .await
    .unwrap();
    assert_eq!(listed.0.len(), 1);

    let filtered = connections::list(
        State(state),
        admin(),
        Query(connections::ConnectionsQuery {
            channel: Some("emojis".to_string()),
        }),
    )
    .await
    .unwrap();
    assert!(filtered.0.is_empty());
}

#[tokio::test]
async fn test_emoji_broadcasts_on_emoji_channel_only() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let mut voter_rx = attach_peer(&state, "default").await;
    let mut reactor_rx = attach_peer(&state, "emojis").await;
    while voter_rx.try_recv().is_ok() {}

    emojis::submit(
        State(state.clone()),
        Json(emojis::EmojiRequest {
            emoji: "🎉".to_string(),
        }),
    )
    .await
    .unwrap();

    let envelope: Envelope = serde_json::from_str(&reactor_rx.recv().await.unwrap()).unwrap();
    assert_eq!(envelope.event, "emoji");
    assert_eq!(envelope.data["emoji"], "🎉");
    assert!(voter_rx.try_recv().is_err());

    let err = emojis::submit(
        State(state),
        Json(emojis::EmojiRequest {
            emoji: "   ".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}
