//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use poll_common::{AppConfig, AppError, CorsConfig, JwtService};
use poll_core::entities::AdminCredential;
use poll_core::traits::{PeerIndex, RecordStore};
use poll_store::FileRecordStore;

use crate::broadcast::ResultsScheduler;
use crate::connection::ConnectionRegistry;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors);
    create_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS layer from configuration; permissive when no origins are listed
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!(dir = %config.data.dir.display(), "Opening record store...");
    let store = Arc::new(
        FileRecordStore::open(
            &config.data.dir,
            AdminCredential {
                username: config.admin.username.clone(),
                password: config.admin.password.clone(),
            },
        )
        .await
        .map_err(|e| AppError::Domain(e.into()))?,
    );
    info!("Record store ready");

    let jwt_service = Arc::new(JwtService::new(&config.jwt.secret, config.jwt.token_expiry));

    let peer_index: Arc<dyn PeerIndex> = store.clone();
    let registry = ConnectionRegistry::new_shared(peer_index);

    let scheduler = ResultsScheduler::new(
        registry.clone(),
        Duration::from_millis(config.broadcast.results_debounce_ms),
    );

    let record_store: Arc<dyn RecordStore> = store;
    Ok(AppState::new(
        record_store,
        registry,
        scheduler,
        jwt_service,
        config,
    ))
}

/// Run the HTTP/WebSocket server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Listening on http://{addr} (WebSocket at ws://{addr}/ws)");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
