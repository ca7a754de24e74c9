//! Database initialization and query tests
//!
//! Covers schema creation, natural-key player resolution, label lookup and
//! the foreign key that keeps players with sessions from being deleted.

use pbt_common::db::init::init_database;
use pbt_common::db::{players, sessions, NewSession};
use pbt_common::storage::StorageKey;
use pbt_common::VideoSource;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn fresh_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("pbt.db")).await.unwrap();
    (dir, pool)
}

fn new_session(player_id: i64, date: &str, name: &str) -> NewSession {
    NewSession {
        player_id,
        date: date.to_string(),
        session_name: name.to_string(),
        video_source: VideoSource::classify("https://youtu.be/dQw4w9WgXcQ"),
        kinovea_csv: None,
        notes: String::new(),
        storage_key: StorageKey::generate(),
    }
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("pbt.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("pbt.db");

    let pool1 = init_database(&db_path).await.unwrap();
    players::insert_player(&pool1, "Ace", "Hawks", "").await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    assert_eq!(players::list_players(&pool2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolve_player_is_case_insensitive() {
    let (_dir, pool) = fresh_db().await;
    let mut conn = pool.acquire().await.unwrap();

    let (first, created) = players::resolve_player(&mut conn, "Sam Reyes", "Tigers").await.unwrap();
    assert!(created);

    let (second, created) = players::resolve_player(&mut conn, "SAM REYES", "tigers ").await.unwrap();
    assert!(!created);
    assert_eq!(first, second);

    let (third, created) = players::resolve_player(&mut conn, "Sam Reyes", "Lions").await.unwrap();
    assert!(created);
    assert_ne!(first, third);

    let stored = players::get_player(&pool, first).await.unwrap().unwrap();
    assert_eq!(stored.name, "Sam Reyes");
    assert_eq!(stored.team, "Tigers");
    assert_eq!(stored.notes, "");
}

#[tokio::test]
async fn test_natural_key_is_unique() {
    let (_dir, pool) = fresh_db().await;
    players::insert_player(&pool, "Ace", "Hawks", "").await.unwrap();
    assert!(players::insert_player(&pool, "ace", "HAWKS", "").await.is_err());
}

#[tokio::test]
async fn test_find_session_by_label_prefers_earliest() {
    let (_dir, pool) = fresh_db().await;
    let player = players::insert_player(&pool, "Ace", "Hawks", "").await.unwrap();

    let first = sessions::insert_session(&pool, &new_session(player, "2025-04-01", "Bullpen"))
        .await
        .unwrap();
    sessions::insert_session(&pool, &new_session(player, "2025-04-01", "Bullpen"))
        .await
        .unwrap();

    let found = sessions::find_session_by_label(&pool, player, "2025-04-01 - Bullpen")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first);
    assert_eq!(found.label(), "2025-04-01 - Bullpen");

    let missing = sessions::find_session_by_label(&pool, player, "2025-04-02 - Bullpen")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_player_with_sessions_cannot_be_deleted_by_foreign_key() {
    let (_dir, pool) = fresh_db().await;
    let player = players::insert_player(&pool, "Ace", "Hawks", "").await.unwrap();
    sessions::insert_session(&pool, &new_session(player, "2025-04-01", "Game"))
        .await
        .unwrap();

    assert!(players::delete_player(&pool, player).await.is_err());
    assert_eq!(players::count_sessions(&pool, player).await.unwrap(), 1);
}

#[tokio::test]
async fn test_player_summaries_count_sessions() {
    let (_dir, pool) = fresh_db().await;
    let busy = players::insert_player(&pool, "Ace", "Hawks", "").await.unwrap();
    let idle = players::insert_player(&pool, "Rook", "Hawks", "").await.unwrap();
    sessions::insert_session(&pool, &new_session(busy, "2025-04-01", "A"))
        .await
        .unwrap();
    sessions::insert_session(&pool, &new_session(busy, "2025-04-02", "B"))
        .await
        .unwrap();

    let summaries = players::list_player_summaries(&pool).await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].player.id, busy);
    assert_eq!(summaries[0].session_count, 2);
    assert_eq!(summaries[1].player.id, idle);
    assert_eq!(summaries[1].session_count, 0);
}
