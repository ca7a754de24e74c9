//! Admin endpoints
//!
//! Every destructive call needs `{"confirm": true}` in its body, the API
//! counterpart of the confirmation checkbox on the admin tab.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::post,
    Json, Router,
};
use pbt_common::db::Player;
use serde::Deserialize;

use crate::services::admin::{self, DeleteSessionReport, PruneReport};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// Missing, malformed and `false` confirmations are all a 400
fn require_confirmation(request: Result<Json<ConfirmRequest>, JsonRejection>) -> ApiResult<()> {
    match request {
        Ok(Json(ConfirmRequest { confirm: true })) => Ok(()),
        Ok(_) | Err(JsonRejection::MissingJsonContentType(_)) => {
            Err(ApiError::BadRequest("Confirmation required".to_string()))
        }
        Err(rejection) => Err(ApiError::BadRequest(format!(
            "Confirmation required: {}",
            rejection.body_text()
        ))),
    }
}

/// POST /api/admin/sessions/:id/delete
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    request: Result<Json<ConfirmRequest>, JsonRejection>,
) -> ApiResult<Json<DeleteSessionReport>> {
    require_confirmation(request)?;
    Ok(Json(admin::delete_session(&state.db, session_id).await?))
}

/// POST /api/admin/players/:id/delete
///
/// 409 while the player still has sessions.
pub async fn delete_player(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
    request: Result<Json<ConfirmRequest>, JsonRejection>,
) -> ApiResult<Json<Player>> {
    require_confirmation(request)?;
    Ok(Json(admin::delete_player(&state.db, player_id).await?))
}

/// POST /api/admin/prune
pub async fn prune(
    State(state): State<AppState>,
    request: Result<Json<ConfirmRequest>, JsonRejection>,
) -> ApiResult<Json<PruneReport>> {
    require_confirmation(request)?;
    Ok(Json(admin::prune_broken_sessions(&state.db).await?))
}

/// Build admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/sessions/:id/delete", post(delete_session))
        .route("/api/admin/players/:id/delete", post(delete_player))
        .route("/api/admin/prune", post(prune))
}
