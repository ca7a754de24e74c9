//! Session view and side-by-side comparison

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::services::retrieval::{
    self, ComparisonView, PanelRequest, SessionSelector, SessionView,
};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for GET /api/view
///
/// The session is picked by `session_id`, or by its `"<date> - <name>"`
/// label in `session`. `metrics` is a comma-separated list; omitted or
/// empty selects every available metric.
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub player_id: i64,
    pub session: Option<String>,
    pub session_id: Option<i64>,
    pub metrics: Option<String>,
}

/// Query parameters for GET /api/compare, one `left_`/`right_` set per side
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub left_player_id: i64,
    pub left_session: Option<String>,
    pub left_session_id: Option<i64>,
    pub left_metrics: Option<String>,
    pub right_player_id: i64,
    pub right_session: Option<String>,
    pub right_session_id: Option<i64>,
    pub right_metrics: Option<String>,
}

fn parse_metrics(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn panel_request(
    player_id: i64,
    session: Option<&str>,
    session_id: Option<i64>,
    metrics: Option<&str>,
) -> ApiResult<PanelRequest> {
    let session = match (session_id, session.map(str::trim)) {
        (Some(id), _) => SessionSelector::Id(id),
        (None, Some(label)) if !label.is_empty() => SessionSelector::Label(label.to_string()),
        _ => {
            return Err(ApiError::BadRequest(
                "Either session or session_id is required".to_string(),
            ))
        }
    };

    Ok(PanelRequest {
        player_id,
        session,
        metrics: parse_metrics(metrics),
    })
}

/// GET /api/view
pub async fn view_session(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Json<SessionView>> {
    let request = panel_request(
        query.player_id,
        query.session.as_deref(),
        query.session_id,
        query.metrics.as_deref(),
    )?;
    Ok(Json(
        retrieval::view_session(&state.db, &state.config, &request).await?,
    ))
}

/// GET /api/compare
///
/// Each side resolves independently; a failing side is reported in place
/// rather than failing the whole request.
pub async fn compare_sessions(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> ApiResult<Json<ComparisonView>> {
    let left = panel_request(
        query.left_player_id,
        query.left_session.as_deref(),
        query.left_session_id,
        query.left_metrics.as_deref(),
    )?;
    let right = panel_request(
        query.right_player_id,
        query.right_session.as_deref(),
        query.right_session_id,
        query.right_metrics.as_deref(),
    )?;
    Ok(Json(
        retrieval::compare_sessions(&state.db, &state.config, &left, &right).await,
    ))
}
