//! pbt-dash library - Pitcher Biomechanics Tracker dashboard
//!
//! HTTP service for uploading pitching sessions, viewing their video and
//! kinematic charts, comparing two sessions side by side, and admin cleanup.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use pbt_common::storage::FileStore;
use pbt_common::DashboardConfig;
use sqlx::SqlitePool;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Storage layout, metric palette and operator settings
    pub config: Arc<DashboardConfig>,
    /// Uploaded file storage
    pub store: FileStore,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: DashboardConfig) -> Self {
        let store = config.file_store();
        Self {
            db,
            config: Arc::new(config),
            store,
        }
    }
}

/// Build application router
///
/// Health, build info, UI and media routes are public; everything under
/// `/api` passes the operator token check.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let upload_limit = state.config.max_upload_bytes;

    let protected = Router::new()
        .route("/api/me", get(api::whoami))
        .route("/api/players", get(api::list_players))
        .route("/api/players/:id/sessions", get(api::list_player_sessions))
        .route(
            "/api/sessions",
            post(api::upload_session).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/view", get(api::view_session))
        .route("/api/compare", get(api::compare_sessions))
        .route("/api/raw", get(api::raw_tables))
        .merge(api::admin_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .nest_service("/media/videos", ServeDir::new(&state.config.video_dir));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
