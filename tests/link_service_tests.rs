//! LinkService tests against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use linkvault::config::DurabilityPolicy;
use linkvault::deletion::DeletionPipeline;
use linkvault::errors::LinkvaultError;
use linkvault::services::{BatchShortenItem, LinkService, Resolution, ShortenOutcome};
use linkvault::storage::memory::EventLog;
use linkvault::storage::{MemoryStore, Repository};
use linkvault::utils::generate_id;
use tempfile::TempDir;

struct Harness {
    service: LinkService,
    pipeline: DeletionPipeline,
    repo: Arc<MemoryStore>,
    _dir: TempDir,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let log = EventLog::open(dir.path().join("output.out")).unwrap();
    let repo = Arc::new(MemoryStore::with_log(log, DurabilityPolicy::BestEffort));
    let pipeline = DeletionPipeline::spawn(repo.clone());
    let service = LinkService::new(repo.clone(), pipeline.queue(), "http://localhost:8080/");
    Harness {
        service,
        pipeline,
        repo,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_shorten_creates_then_reports_existing() {
    let h = harness();
    let expected = format!("http://localhost:8080/{}", generate_id("https://example.com"));

    let first = h.service.shorten("https://example.com", "user-1").await.unwrap();
    assert_eq!(first, ShortenOutcome::Created(expected.clone()));

    let second = h.service.shorten("https://example.com", "user-2").await.unwrap();
    assert_eq!(second, ShortenOutcome::Existing(expected));
}

#[tokio::test]
async fn test_shorten_trims_input() {
    let h = harness();
    let outcome = h.service.shorten("  https://example.com  ", "user-1").await.unwrap();
    assert!(outcome.short_url().ends_with(&generate_id("https://example.com")));
}

#[tokio::test]
async fn test_shorten_rejects_invalid_input() {
    let h = harness();
    for (url, owner) in [("", "user-1"), ("not a url", "user-1"), ("ftp://x.org", "user-1"), ("https://example.com", "")] {
        let err = h.service.shorten(url, owner).await.unwrap_err();
        assert!(matches!(err, LinkvaultError::Validation(_)), "{:?} / {:?}", url, owner);
    }
    assert!(h.repo.is_empty());
}

#[tokio::test]
async fn test_resolve_found_gone_and_missing() {
    let h = harness();
    h.service.shorten("https://example.com", "user-1").await.unwrap();
    let id = generate_id("https://example.com");

    assert_eq!(
        h.service.resolve(&id).await.unwrap(),
        Resolution::Found("https://example.com".into())
    );

    h.service.delete_urls(vec![id.clone()], "user-1").unwrap();
    h.pipeline.shutdown(Duration::from_secs(5)).await;
    assert_eq!(h.service.resolve(&id).await.unwrap(), Resolution::Gone);

    let err = h.service.resolve("deadbeef").await.unwrap_err();
    assert!(matches!(err, LinkvaultError::NotFound(_)));
}

#[tokio::test]
async fn test_shorten_batch_echoes_correlation_ids() {
    let h = harness();
    let items = vec![
        BatchShortenItem {
            correlation_id: "a".into(),
            original_url: "https://a.example.com".into(),
        },
        BatchShortenItem {
            correlation_id: "b".into(),
            original_url: "https://b.example.com".into(),
        },
        BatchShortenItem {
            correlation_id: "c".into(),
            original_url: "https://a.example.com".into(),
        },
    ];

    let results = h.service.shorten_batch(&items, "user-1").await.unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.correlation_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(results[0].short_url, results[2].short_url);
    assert_eq!(h.service.user_urls("user-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_shorten_batch_is_rejected_when_any_url_exists() {
    let h = harness();
    h.service.shorten("https://b.example.com", "user-1").await.unwrap();

    let items = vec![
        BatchShortenItem {
            correlation_id: "a".into(),
            original_url: "https://a.example.com".into(),
        },
        BatchShortenItem {
            correlation_id: "b".into(),
            original_url: "https://b.example.com".into(),
        },
    ];
    let err = h.service.shorten_batch(&items, "user-1").await.unwrap_err();
    assert!(err.is_already_exists());
    assert!(h.repo.get(&generate_id("https://a.example.com")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_shorten_batch_rejects_empty_and_invalid() {
    let h = harness();
    assert!(h.service.shorten_batch(&[], "user-1").await.is_err());

    let items = vec![BatchShortenItem {
        correlation_id: "x".into(),
        original_url: "nope".into(),
    }];
    let err = h.service.shorten_batch(&items, "user-1").await.unwrap_err();
    assert!(err.message().contains("x"));
}

#[tokio::test]
async fn test_delete_only_affects_owner() {
    let h = harness();
    h.service.shorten("https://a.example.com", "user-1").await.unwrap();
    h.service.shorten("https://b.example.com", "user-2").await.unwrap();

    h.service
        .delete_urls(
            vec![
                generate_id("https://a.example.com"),
                generate_id("https://b.example.com"),
            ],
            "user-1",
        )
        .unwrap();
    h.pipeline.shutdown(Duration::from_secs(5)).await;

    assert!(h.service.user_urls("user-1").await.unwrap().is_empty());
    assert_eq!(h.service.user_urls("user-2").await.unwrap().len(), 1);
    let stats = h.service.stats().await.unwrap();
    assert_eq!((stats.urls, stats.users), (1, 1));
}

#[tokio::test]
async fn test_delete_after_pipeline_shutdown_is_reported() {
    let h = harness();
    h.pipeline.shutdown(Duration::from_secs(1)).await;
    let err = h
        .service
        .delete_urls(vec!["aaaa0001".into()], "user-1")
        .unwrap_err();
    assert!(matches!(err, LinkvaultError::PipelineClosed(_)));
}

#[tokio::test]
async fn test_ping_reports_healthy_store() {
    let h = harness();
    h.service.ping().await.unwrap();
}
