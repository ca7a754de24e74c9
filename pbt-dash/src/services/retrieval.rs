//! Session retrieval, visualization and comparison
//!
//! Every panel degrades independently: a bad YouTube link, a missing local
//! file or an unreadable CSV produces a warning or error panel while the rest
//! of the view still resolves.

use pbt_common::db::{players, sessions, Player, PlayerSummary, Session};
use pbt_common::kinematics::{
    self, ChartStyle, Chart, KinematicTable, TablePreview, PREVIEW_ROWS,
};
use pbt_common::storage::{self, FileStore};
use pbt_common::video::{self, VideoSource};
use pbt_common::DashboardConfig;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

pub const NO_KINEMATIC_DATA: &str = "No Kinovea data uploaded for this session.";

/// Which of a player's sessions to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSelector {
    Id(i64),
    /// `"<date> - <session_name>"`
    Label(String),
}

/// One panel's selection: player, session and the metrics to plot
#[derive(Debug, Clone)]
pub struct PanelRequest {
    pub player_id: i64,
    pub session: SessionSelector,
    /// `None` or empty selects every available metric
    pub metrics: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Player {0} not found")]
    PlayerNotFound(i64),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Common(#[from] pbt_common::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoPanel {
    /// Remote link with a recognized YouTube id
    Embed {
        source: String,
        video_id: String,
        embed_url: String,
    },
    /// Local file that exists on disk
    Local {
        path: String,
        media_url: Option<String>,
    },
    InvalidLink { source: String, message: String },
    MissingFile { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KinematicPanel {
    /// No CSV stored, or the stored path no longer resolves
    Absent { message: String },
    TimeSeries {
        preview: TablePreview,
        available_metrics: Vec<String>,
        selected_metrics: Vec<String>,
        chart: Chart,
    },
    /// Time column missing; numeric columns plotted against row index
    RowIndex {
        preview: TablePreview,
        warning: String,
        chart: Chart,
    },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionListing {
    pub id: i64,
    pub label: String,
    pub date: String,
    pub session_name: String,
    pub remote_video: bool,
    pub has_csv: bool,
}

impl From<&Session> for SessionListing {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            label: session.label(),
            date: session.date.clone(),
            session_name: session.session_name.clone(),
            remote_video: session.video().is_remote(),
            has_csv: session.kinovea_csv.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub player: Player,
    pub session: SessionListing,
    pub notes: String,
    pub video: VideoPanel,
    pub kinematics: KinematicPanel,
}

/// One side of a comparison
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonSide {
    Ready(Box<SessionView>),
    Unavailable { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonView {
    pub left: ComparisonSide,
    pub right: ComparisonSide,
}

#[derive(Debug, Clone, Serialize)]
pub struct RawTables {
    pub players: Vec<Player>,
    pub sessions: Vec<Session>,
}

pub async fn list_players(db: &SqlitePool) -> Result<Vec<PlayerSummary>, RetrievalError> {
    Ok(players::list_player_summaries(db).await?)
}

/// A player's sessions; unknown player is an error, no sessions is an empty list
pub async fn list_sessions(
    db: &SqlitePool,
    player_id: i64,
) -> Result<Vec<SessionListing>, RetrievalError> {
    if players::get_player(db, player_id).await?.is_none() {
        return Err(RetrievalError::PlayerNotFound(player_id));
    }
    let rows = sessions::list_sessions_for_player(db, player_id).await?;
    Ok(rows.iter().map(SessionListing::from).collect())
}

/// Both tables in full
pub async fn raw_tables(db: &SqlitePool) -> Result<RawTables, RetrievalError> {
    Ok(RawTables {
        players: players::list_players(db).await?,
        sessions: sessions::list_all_sessions(db).await?,
    })
}

/// Resolve a stored video source into something the page can render
pub async fn resolve_video(source: &str, store: &FileStore) -> VideoPanel {
    match VideoSource::classify(source) {
        VideoSource::Remote(url) => match video::extract_youtube_id(&url) {
            Some(video_id) => VideoPanel::Embed {
                embed_url: video::embed_url(&video_id),
                source: url,
                video_id,
            },
            None => {
                warn!(source = %url, "Could not extract YouTube video id");
                VideoPanel::InvalidLink {
                    source: url,
                    message: "Could not extract video ID. Check the YouTube link.".to_string(),
                }
            }
        },
        VideoSource::Local(path) => {
            if storage::resolves(&path).await {
                VideoPanel::Local {
                    media_url: store
                        .media_name(&path)
                        .map(|name| format!("/media/videos/{}", name)),
                    path: path.to_string_lossy().into_owned(),
                }
            } else {
                warn!(path = %path.display(), "Local video file not found");
                VideoPanel::MissingFile {
                    path: path.to_string_lossy().into_owned(),
                    message: "Local video file not found.".to_string(),
                }
            }
        }
    }
}

/// Load a session's CSV and build its chart
pub async fn load_kinematics(
    csv_path: Option<&str>,
    config: &DashboardConfig,
    metrics: Option<&[String]>,
) -> KinematicPanel {
    let Some(path) = csv_path.map(PathBuf::from) else {
        return absent();
    };
    if !storage::resolves(&path).await {
        debug!(path = %path.display(), "Kinematic CSV missing on disk");
        return absent();
    }

    let config = config.clone();
    let metrics = metrics.map(<[String]>::to_vec);
    let shown = path.display().to_string();

    let built = tokio::task::spawn_blocking(move || {
        let table = KinematicTable::from_path(&path)?;
        build_panel(&table, &config, metrics.as_deref())
    })
    .await;

    match built {
        Ok(Ok(panel)) => panel,
        Ok(Err(e)) => {
            warn!(path = %shown, "Error reading CSV: {}", e);
            KinematicPanel::Error {
                message: format!("Error reading CSV: {}", e),
            }
        }
        Err(e) => KinematicPanel::Error {
            message: format!("Error reading CSV: {}", e),
        },
    }
}

fn absent() -> KinematicPanel {
    KinematicPanel::Absent {
        message: NO_KINEMATIC_DATA.to_string(),
    }
}

/// Chart a parsed table: whitelisted metrics over time, or row-index fallback
pub fn build_panel(
    table: &KinematicTable,
    config: &DashboardConfig,
    metrics: Option<&[String]>,
) -> pbt_common::Result<KinematicPanel> {
    let style = ChartStyle {
        palette: &config.palette,
        time_column: &config.time_column,
        y_label: &config.y_axis_label,
    };
    let preview = table.preview(PREVIEW_ROWS);

    if !table.has_column(&config.time_column) {
        return Ok(KinematicPanel::RowIndex {
            preview,
            warning: format!(
                "Column '{}' not found. Plotting by row index.",
                config.time_column
            ),
            chart: kinematics::row_index_chart(table, style),
        });
    }

    let available = kinematics::available_metrics(table, style);
    let selected = kinematics::select_metrics(&available, metrics);
    let chart = kinematics::time_series_chart(table, style, &selected)?;

    Ok(KinematicPanel::TimeSeries {
        preview,
        available_metrics: available,
        selected_metrics: selected,
        chart,
    })
}

/// Resolve one (player, session) selection into its video and chart panels
pub async fn view_session(
    db: &SqlitePool,
    config: &DashboardConfig,
    request: &PanelRequest,
) -> Result<SessionView, RetrievalError> {
    let player = players::get_player(db, request.player_id)
        .await?
        .ok_or(RetrievalError::PlayerNotFound(request.player_id))?;

    let session = match &request.session {
        SessionSelector::Id(id) => sessions::get_session(db, *id)
            .await?
            .filter(|s| s.player_id == player.id)
            .ok_or_else(|| RetrievalError::SessionNotFound(format!("id {}", id)))?,
        SessionSelector::Label(label) => sessions::find_session_by_label(db, player.id, label)
            .await?
            .ok_or_else(|| RetrievalError::SessionNotFound(label.clone()))?,
    };

    let store = config.file_store();
    let (video, kinematics) = tokio::join!(
        resolve_video(&session.video_source, &store),
        load_kinematics(
            session.kinovea_csv.as_deref(),
            config,
            request.metrics.as_deref()
        ),
    );

    Ok(SessionView {
        session: SessionListing::from(&session),
        notes: session.notes,
        player,
        video,
        kinematics,
    })
}

/// Resolve two independent selections side by side
pub async fn compare_sessions(
    db: &SqlitePool,
    config: &DashboardConfig,
    left: &PanelRequest,
    right: &PanelRequest,
) -> ComparisonView {
    let (left, right) = tokio::join!(
        view_session(db, config, left),
        view_session(db, config, right),
    );

    ComparisonView {
        left: side(left),
        right: side(right),
    }
}

fn side(result: Result<SessionView, RetrievalError>) -> ComparisonSide {
    match result {
        Ok(view) => ComparisonSide::Ready(Box::new(view)),
        Err(e) => ComparisonSide::Unavailable {
            message: e.to_string(),
        },
    }
}
