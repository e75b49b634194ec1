//! HTTP request handlers

pub mod answers;
pub mod auth;
pub mod connections;
pub mod emojis;
pub mod health;
pub mod questions;
pub mod results;

use crate::response::ApiResult;
use crate::state::AppState;

/// Queue a coalesced results broadcast for the active question
///
/// A no-op when nothing is active (the triggering mutation may have raced a
/// publish); storage faults still surface.
pub(crate) async fn schedule_current_results(state: &AppState) -> ApiResult<()> {
    if let Some(tally) = state.store().get_current_results().await? {
        let snapshot = tally.into_snapshot(state.registry().connection_count() as u64);
        state.scheduler().schedule(snapshot);
    }
    Ok(())
}
