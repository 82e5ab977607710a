//! Live integration tests for the Postgres backend using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated database from the sqlx test
//! harness. They need `DATABASE_URL` pointing at a Postgres server, so they
//! are ignored by default: `cargo test -p livewall-store -- --ignored`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use livewall_core::{LiveItem, Platform, Ranking, Snapshot};
use livewall_store::{PgBackend, SnapshotBackend, SnapshotStore, StoreError};
use sqlx::PgPool;

fn snapshot_with(native_ids: &[&str]) -> Snapshot {
    let items = native_ids
        .iter()
        .map(|native| LiveItem {
            id: LiveItem::compose_id(Platform::Twitch, native),
            platform: Platform::Twitch,
            title: (*native).to_string(),
            thumbnail_url: String::new(),
            viewers: 10,
            url: format!("https://www.twitch.tv/{native}"),
            raw: serde_json::Map::new(),
        })
        .collect();
    Snapshot::assemble(
        vec![(Platform::Twitch, items)],
        Ranking::PlatformOrder,
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    )
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn put_and_get_round_trip(pool: PgPool) {
    let store = SnapshotStore::new(Arc::new(PgBackend::new(pool)), "live-json");
    assert!(store.get().await.unwrap().is_none());

    let snapshot = snapshot_with(&["a", "b"]);
    store.put(&snapshot).await.unwrap();
    assert_eq!(store.get().await.unwrap(), Some(snapshot));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn second_put_replaces_the_row(pool: PgPool) {
    let store = SnapshotStore::new(Arc::new(PgBackend::new(pool.clone())), "live-json");
    store.put(&snapshot_with(&["a"])).await.unwrap();
    store.put(&snapshot_with(&["z"])).await.unwrap();

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM live_snapshots")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let stored = store.get().await.unwrap().expect("snapshot present");
    assert_eq!(stored.all[0].id, "twitch_z");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn corrupt_row_is_reported(pool: PgPool) {
    let backend = PgBackend::new(pool);
    backend.put_raw("live-json", "not json").await.unwrap();

    let store = SnapshotStore::new(Arc::new(backend), "live-json");
    assert!(matches!(
        store.get().await,
        Err(StoreError::Corrupt { .. })
    ));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ping_succeeds_on_live_pool(pool: PgPool) {
    let store = SnapshotStore::new(Arc::new(PgBackend::new(pool)), "live-json");
    store.health_check().await.unwrap();
}
