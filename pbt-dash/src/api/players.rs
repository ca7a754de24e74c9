//! Player and session listing

use axum::{
    extract::{Path, State},
    Json,
};
use pbt_common::db::PlayerSummary;

use crate::services::retrieval::{self, SessionListing};
use crate::{ApiResult, AppState};

/// GET /api/players
///
/// All players with their session counts.
pub async fn list_players(State(state): State<AppState>) -> ApiResult<Json<Vec<PlayerSummary>>> {
    Ok(Json(retrieval::list_players(&state.db).await?))
}

/// GET /api/players/:id/sessions
///
/// A player's sessions with their labels. An empty list means the player
/// has no sessions yet.
pub async fn list_player_sessions(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
) -> ApiResult<Json<Vec<SessionListing>>> {
    Ok(Json(retrieval::list_sessions(&state.db, player_id).await?))
}
