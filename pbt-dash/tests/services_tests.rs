//! Service-level tests: panel degradation and admin edge cases

use pbt_common::db::{init_database, players, sessions, NewSession};
use pbt_common::kinematics::KinematicTable;
use pbt_common::storage::StorageKey;
use pbt_common::{DashboardConfig, VideoSource};
use pbt_dash::services::admin;
use pbt_dash::services::ingest::{self, IngestError, IngestRequest, VideoInput};
use pbt_dash::services::retrieval::{self, KinematicPanel, VideoPanel, NO_KINEMATIC_DATA};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup() -> (TempDir, DashboardConfig, SqlitePool) {
    let root = TempDir::new().unwrap();
    let config = DashboardConfig::for_root(root.path());
    config.ensure_directories().unwrap();
    let pool = init_database(&config.database_path).await.unwrap();
    (root, config, pool)
}

#[tokio::test]
async fn test_unrecognized_youtube_link_warns() {
    let (_root, config, _pool) = setup().await;
    let panel =
        retrieval::resolve_video("https://vimeo.com/123456", &config.file_store()).await;
    assert!(matches!(panel, VideoPanel::InvalidLink { .. }));
}

#[tokio::test]
async fn test_missing_local_video_warns() {
    let (_root, config, _pool) = setup().await;
    let missing = config.video_dir.join("gone.mp4");
    let panel =
        retrieval::resolve_video(&missing.to_string_lossy(), &config.file_store()).await;
    match panel {
        VideoPanel::MissingFile { message, .. } => {
            assert_eq!(message, "Local video file not found.")
        }
        other => panic!("unexpected panel: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_csv_reports_no_data() {
    let (_root, config, _pool) = setup().await;
    let missing = config.data_dir.join("gone.csv");

    for path in [None, Some(missing.to_string_lossy().into_owned())] {
        let panel = retrieval::load_kinematics(path.as_deref(), &config, None).await;
        assert_eq!(
            panel,
            KinematicPanel::Absent {
                message: NO_KINEMATIC_DATA.to_string()
            }
        );
    }
}

#[tokio::test]
async fn test_unparseable_time_column_is_inline_error() {
    let (_root, config, _pool) = setup().await;
    let path = config.data_dir.join("bad.csv");
    std::fs::write(&path, "Time (ms),TE\nabc,1.0\n").unwrap();

    let panel =
        retrieval::load_kinematics(Some(path.to_str().unwrap()), &config, None).await;
    match panel {
        KinematicPanel::Error { message } => assert!(message.starts_with("Error reading CSV")),
        other => panic!("unexpected panel: {:?}", other),
    }
}

#[test]
fn test_row_index_fallback_colors_unknown_columns_grey() {
    let config = DashboardConfig::for_root("/unused");
    let table = KinematicTable::from_bytes(b"Frame,TE,Label\n1,0.5,a\n2,0.7,b\n").unwrap();

    match retrieval::build_panel(&table, &config, None).unwrap() {
        KinematicPanel::RowIndex { warning, chart, .. } => {
            assert_eq!(warning, "Column 'Time (ms)' not found. Plotting by row index.");
            let series: Vec<(&str, &str)> = chart
                .series
                .iter()
                .map(|s| (s.name.as_str(), s.color.as_str()))
                .collect();
            assert_eq!(series, vec![("Frame", "#cccccc"), ("TE", "#1f77b4")]);
        }
        other => panic!("unexpected panel: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_session_without_csv_removes_only_row() {
    let (_root, config, pool) = setup().await;
    let mut conn = pool.acquire().await.unwrap();
    let (player_id, _) = players::resolve_player(&mut conn, "Sam Reyes", "Tigers")
        .await
        .unwrap();
    drop(conn);

    let session_id = sessions::insert_session(
        &pool,
        &NewSession {
            player_id,
            date: "2025-04-01".to_string(),
            session_name: "Bullpen".to_string(),
            video_source: VideoSource::Remote("https://youtu.be/dQw4w9WgXcQ".to_string()),
            kinovea_csv: None,
            notes: String::new(),
            storage_key: StorageKey::generate(),
        },
    )
    .await
    .unwrap();

    let report = admin::delete_session(&pool, session_id).await.unwrap();
    assert!(report.row_deleted);
    assert!(!report.csv_deleted);
    assert!(report.errors.is_empty());
    assert_eq!(report.label, "2025-04-01 - Bullpen");

    // Player survives losing its last session
    assert!(players::get_player(&pool, player_id).await.unwrap().is_some());
    assert!(config.data_dir.exists());
}

fn dir_entries(path: &std::path::Path) -> usize {
    std::fs::read_dir(path).unwrap().count()
}

fn new_session(player_id: i64, name: &str, csv: Option<std::path::PathBuf>) -> NewSession {
    NewSession {
        player_id,
        date: "2025-04-01".to_string(),
        session_name: name.to_string(),
        video_source: VideoSource::Remote("https://youtu.be/dQw4w9WgXcQ".to_string()),
        kinovea_csv: csv,
        notes: String::new(),
        storage_key: StorageKey::generate(),
    }
}

#[tokio::test]
async fn test_failed_insert_removes_written_files() {
    let (_root, config, pool) = setup().await;
    sqlx::query("DROP TABLE sessions")
        .execute(&pool)
        .await
        .unwrap();

    let request = IngestRequest {
        player_name: "Sam Reyes".to_string(),
        team: "Tigers".to_string(),
        session_name: "Bullpen".to_string(),
        date: "2025-04-01".to_string(),
        notes: String::new(),
        video: VideoInput::File(b"not really an mp4".to_vec()),
        csv: Some(b"Time (ms),TE\n0,1\n".to_vec()),
    };

    let result = ingest::ingest_session(&pool, &config.file_store(), request).await;
    assert!(matches!(result, Err(IngestError::Common(_))));

    assert_eq!(dir_entries(&config.data_dir), 0);
    assert_eq!(dir_entries(&config.video_dir), 0);
    assert!(players::list_players(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_session_reports_csv_failure_but_removes_row() {
    let (_root, config, pool) = setup().await;
    let mut conn = pool.acquire().await.unwrap();
    let (player_id, _) = players::resolve_player(&mut conn, "Sam Reyes", "Tigers")
        .await
        .unwrap();
    drop(conn);

    // A directory where the CSV should be cannot be removed as a file
    let blocker = config.data_dir.join("blocker.csv");
    std::fs::create_dir(&blocker).unwrap();
    let session_id =
        sessions::insert_session(&pool, &new_session(player_id, "Bullpen", Some(blocker.clone())))
            .await
            .unwrap();

    let report = admin::delete_session(&pool, session_id).await.unwrap();
    assert!(report.row_deleted);
    assert!(!report.csv_deleted);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Error deleting CSV"));
    assert!(blocker.exists());
}

#[tokio::test]
async fn test_prune_reports_rows_it_could_not_remove() {
    let (_root, config, pool) = setup().await;
    let mut conn = pool.acquire().await.unwrap();
    let (player_id, _) = players::resolve_player(&mut conn, "Sam Reyes", "Tigers")
        .await
        .unwrap();
    drop(conn);

    let missing = config.data_dir.join("gone.csv");
    sessions::insert_session(&pool, &new_session(player_id, "Bullpen", Some(missing)))
        .await
        .unwrap();
    sqlx::query(
        "CREATE TRIGGER keep_sessions BEFORE DELETE ON sessions \
         BEGIN SELECT RAISE(ABORT, 'sessions are locked'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let report = admin::prune_broken_sessions(&pool).await.unwrap();
    assert_eq!(report.scanned, 1);
    assert_eq!(report.removed, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Bullpen"));
    assert_eq!(sessions::list_all_sessions(&pool).await.unwrap().len(), 1);
}
