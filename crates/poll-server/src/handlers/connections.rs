//! Connection listing handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use poll_core::entities::PeerInfo;

use crate::extractors::AdminUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// Optional channel filter
#[derive(Debug, Deserialize)]
pub struct ConnectionsQuery {
    pub channel: Option<String>,
}

/// List connected peers from the persisted side index
///
/// GET /api/websockets/connections
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ConnectionsQuery>,
) -> ApiResult<Json<Vec<PeerInfo>>> {
    let peers = state
        .registry()
        .list_peers(query.channel.as_deref())
        .await?;
    Ok(Json(peers))
}
