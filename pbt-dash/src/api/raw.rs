//! Raw table dump
//!
//! Both tables in full, for the "show raw database" debug view.

use axum::{extract::State, Json};

use crate::services::retrieval::{self, RawTables};
use crate::{ApiResult, AppState};

/// GET /api/raw
pub async fn raw_tables(State(state): State<AppState>) -> ApiResult<Json<RawTables>> {
    Ok(Json(retrieval::raw_tables(&state.db).await?))
}
