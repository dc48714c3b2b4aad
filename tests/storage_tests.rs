//! Storage backend tests
//!
//! Tests for SeaOrmStore using temporary SQLite databases.

use linkvault::config::DatabaseConfig;
use linkvault::errors::LinkvaultError;
use linkvault::storage::backend::{Backend, SeaOrmStore, infer_backend_from_url};
use linkvault::storage::{DeletionRequest, InternalStats, Repository, StorageType, UrlWithCorrelation};
use tempfile::TempDir;

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_store() -> (SeaOrmStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        retry_base_delay_ms: 5,
        retry_max_delay_ms: 20,
        ..Default::default()
    };

    let store = SeaOrmStore::connect(&config)
        .await
        .expect("Failed to create store");
    (store, temp_dir)
}

fn entry(short_id: &str, url: &str, correlation_id: &str) -> UrlWithCorrelation {
    UrlWithCorrelation {
        short_id: short_id.to_string(),
        original_url: url.to_string(),
        correlation_id: correlation_id.to_string(),
    }
}

#[tokio::test]
async fn test_connect_runs_migrations_and_reports_type() {
    let (store, _dir) = create_temp_store().await;
    assert_eq!(store.get_type(), StorageType::Database);
    assert_eq!(store.backend(), Backend::Sqlite);
    store.ping().await.unwrap();
    assert_eq!(store.stats().await.unwrap(), InternalStats::default());
}

#[tokio::test]
async fn test_connect_is_idempotent_on_existing_schema() {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", temp_dir.path().join("x.db").display()),
        ..Default::default()
    };

    let first = SeaOrmStore::connect(&config).await.unwrap();
    first.save("a1b2c3d4", "https://example.com", "user-1").await.unwrap();
    first.close().await.unwrap();

    let second = SeaOrmStore::connect(&config).await.unwrap();
    assert!(second.get("a1b2c3d4").await.unwrap().is_some());
}

#[tokio::test]
async fn test_connect_rejects_empty_url() {
    let err = SeaOrmStore::connect(&DatabaseConfig::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, LinkvaultError::DatabaseConfig(_)));
}

#[tokio::test]
async fn test_save_get_and_duplicate() {
    let (store, _dir) = create_temp_store().await;

    store.save("a1b2c3d4", "https://example.com", "user-1").await.unwrap();
    let record = store.get("a1b2c3d4").await.unwrap().unwrap();
    assert_eq!(record.original_url, "https://example.com");
    assert_eq!(record.owner_id, "user-1");
    assert!(!record.deleted);

    let err = store
        .save("a1b2c3d4", "https://example.com", "user-2")
        .await
        .unwrap_err();
    assert!(err.is_already_exists(), "got {:?}", err);

    let record = store.get("a1b2c3d4").await.unwrap().unwrap();
    assert_eq!(record.owner_id, "user-1");
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let (store, _dir) = create_temp_store().await;
    assert!(store.get("deadbeef").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_batch_commits_all() {
    let (store, _dir) = create_temp_store().await;
    let batch = vec![
        entry("aaaa0001", "https://a.example.com", "1"),
        entry("aaaa0002", "https://b.example.com", "2"),
    ];

    store.save_batch(&batch, "user-1").await.unwrap();
    let urls = store.get_by_owner("user-1").await.unwrap();
    assert_eq!(urls.len(), 2);
}

#[tokio::test]
async fn test_save_batch_rolls_back_on_conflict() {
    let (store, _dir) = create_temp_store().await;
    store.save("aaaa0002", "https://b.example.com", "user-1").await.unwrap();

    let batch = vec![
        entry("aaaa0001", "https://a.example.com", "1"),
        entry("aaaa0002", "https://b.example.com", "2"),
        entry("aaaa0003", "https://c.example.com", "3"),
    ];
    let err = store.save_batch(&batch, "user-1").await.unwrap_err();
    assert!(err.is_already_exists(), "got {:?}", err);

    assert!(store.get("aaaa0001").await.unwrap().is_none());
    assert!(store.get("aaaa0003").await.unwrap().is_none());
    assert_eq!(store.stats().await.unwrap().urls, 1);
}

#[tokio::test]
async fn test_delete_batch_is_scoped_by_owner() {
    let (store, _dir) = create_temp_store().await;
    store.save("aaaa0001", "https://a.example.com", "user-1").await.unwrap();
    store.save("aaaa0002", "https://b.example.com", "user-2").await.unwrap();

    let request = DeletionRequest::new(
        vec!["aaaa0001".into(), "aaaa0002".into(), "missing0".into()],
        "user-1",
    );
    assert_eq!(store.delete_batch(&request).await.unwrap(), 1);
    assert!(store.get("aaaa0001").await.unwrap().unwrap().deleted);
    assert!(!store.get("aaaa0002").await.unwrap().unwrap().deleted);

    // 已删除的行不再计数
    assert_eq!(store.delete_batch(&request).await.unwrap(), 0);
    // 短 ID 仍被占用
    assert!(
        store
            .save("aaaa0001", "https://a.example.com", "user-1")
            .await
            .unwrap_err()
            .is_already_exists()
    );
}

#[tokio::test]
async fn test_get_by_owner_hides_deleted() {
    let (store, _dir) = create_temp_store().await;
    store.save("aaaa0001", "https://a.example.com", "user-1").await.unwrap();
    store.save("aaaa0002", "https://b.example.com", "user-1").await.unwrap();
    store
        .delete_batch(&DeletionRequest::new(vec!["aaaa0001".into()], "user-1"))
        .await
        .unwrap();

    let ids: Vec<String> = store
        .get_by_owner("user-1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.short_id)
        .collect();
    assert_eq!(ids, ["aaaa0002"]);
    assert!(store.get_by_owner("user-9").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_by_owner_keeps_batch_insertion_order() {
    let (store, _dir) = create_temp_store().await;
    // 同一事务内写入，created_at 几乎相同；顺序刻意不按字典序
    let batch = vec![
        entry("ffff0001", "https://f.example.com", "0"),
        entry("1111aaaa", "https://one.example.com", "1"),
        entry("9999bbbb", "https://nine.example.com", "2"),
        entry("0000cccc", "https://zero.example.com", "3"),
    ];
    store.save_batch(&batch, "user-1").await.unwrap();
    store.save("5555dddd", "https://five.example.com", "user-1").await.unwrap();

    let ids: Vec<String> = store
        .get_by_owner("user-1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.short_id)
        .collect();
    assert_eq!(ids, ["ffff0001", "1111aaaa", "9999bbbb", "0000cccc", "5555dddd"]);
}

#[tokio::test]
async fn test_stats_counts_live_urls_and_distinct_owners() {
    let (store, _dir) = create_temp_store().await;
    store.save("aaaa0001", "https://a.example.com", "user-1").await.unwrap();
    store.save("aaaa0002", "https://b.example.com", "user-1").await.unwrap();
    store.save("aaaa0003", "https://c.example.com", "user-2").await.unwrap();
    store
        .delete_batch(&DeletionRequest::new(vec!["aaaa0003".into()], "user-2"))
        .await
        .unwrap();

    assert_eq!(
        store.stats().await.unwrap(),
        InternalStats { urls: 2, users: 1 }
    );
}

#[test]
fn test_infer_backend_from_url() {
    assert_eq!(infer_backend_from_url("sqlite://a.db").unwrap(), Backend::Sqlite);
    assert_eq!(infer_backend_from_url("mysql://h/db").unwrap(), Backend::Mysql);
    assert_eq!(infer_backend_from_url("postgres://h/db").unwrap(), Backend::Postgres);
    assert!(infer_backend_from_url("ftp://h").is_err());
}
