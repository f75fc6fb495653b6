//! Cache behavior integration tests.
//!
//! Tests verify:
//! - Repeated requests avoid duplicate transcoding
//! - Capacity eviction keeps the entry count bounded and is LRU-ordered
//! - TTL expiry triggers re-production
//! - Determinism of cache-populated responses

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use imagemill::{create_router, DerivativeService, RouterConfig, DEFAULT_JPEG_QUALITY};

use super::test_utils::{create_test_jpeg, MemorySource};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_repeated_requests_read_source_once() {
    let source = Arc::new(MemorySource::new().with_asset("a.jpg", create_test_jpeg(800, 600)));
    let reads = source.read_counter();
    let service = DerivativeService::new(source);
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    for _ in 0..5 {
        let response = router
            .clone()
            .oneshot(get("/images/a.jpg?width=400"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(reads.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_distinct_widths_are_cached_independently() {
    let source = Arc::new(MemorySource::new().with_asset("a.jpg", create_test_jpeg(800, 600)));
    let reads = source.read_counter();
    let service = DerivativeService::new(source);
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    for uri in [
        "/images/a.jpg?width=400",
        "/images/a.jpg?width=200",
        "/images/a.jpg?width=400",
        "/images/a.jpg?width=200",
    ] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // One production per distinct width, none for the repeats.
    assert_eq!(reads.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_capacity_eviction_is_bounded_and_lru() {
    let source = Arc::new(
        MemorySource::new()
            .with_asset("a.jpg", create_test_jpeg(200, 150))
            .with_asset("b.jpg", create_test_jpeg(200, 150))
            .with_asset("c.jpg", create_test_jpeg(200, 150)),
    );
    let service = DerivativeService::with_limits(
        source,
        2,
        Duration::from_secs(600),
        DEFAULT_JPEG_QUALITY,
    );

    service.get_derivative("a.jpg", 100).await.unwrap();
    service.get_derivative("b.jpg", 100).await.unwrap();
    assert_eq!(service.cache().len().await, 2);

    // Touch "a" so "b" is the least recently used.
    assert!(service.get_derivative("a.jpg", 100).await.unwrap().cache_hit);

    service.get_derivative("c.jpg", 100).await.unwrap();
    assert_eq!(service.cache().len().await, 2);

    // "a" survived, "b" was evicted and re-produces on the next fetch.
    assert!(service.get_derivative("a.jpg", 100).await.unwrap().cache_hit);
    assert!(!service.get_derivative("b.jpg", 100).await.unwrap().cache_hit);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_expiry_forces_reproduction() {
    let source = Arc::new(MemorySource::new().with_asset("a.jpg", create_test_jpeg(400, 300)));
    let reads = source.read_counter();
    let service = DerivativeService::with_limits(
        source,
        16,
        Duration::from_secs(60),
        DEFAULT_JPEG_QUALITY,
    );

    let first = service.get_derivative("a.jpg", 200).await.unwrap();
    assert!(!first.cache_hit);

    tokio::time::advance(Duration::from_secs(30)).await;
    assert!(service.get_derivative("a.jpg", 200).await.unwrap().cache_hit);

    tokio::time::advance(Duration::from_secs(31)).await;
    let after_expiry = service.get_derivative("a.jpg", 200).await.unwrap();
    assert!(!after_expiry.cache_hit);
    assert_eq!(reads.load(std::sync::atomic::Ordering::SeqCst), 2);

    // Re-production yields identical bytes for identical inputs.
    assert_eq!(after_expiry.data, first.data);
}

#[tokio::test]
async fn test_cache_populated_responses_are_byte_identical() {
    let source = Arc::new(MemorySource::new().with_asset("a.jpg", create_test_jpeg(800, 600)));
    let service = DerivativeService::new(source);
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    let mut bodies = Vec::new();
    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(get("/images/a.jpg?width=400"))
            .await
            .unwrap();
        bodies.push(response.into_body().collect().await.unwrap().to_bytes());
    }

    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}
