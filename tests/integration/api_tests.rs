//! API integration tests for derivative retrieval and error handling.
//!
//! Tests verify:
//! - Derivative retrieval with explicit, default, and malformed widths
//! - Passthrough for non-raster sources
//! - HTTP response codes, headers, and error bodies
//! - Static file serving and the health endpoint

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use imagemill::{create_router, DerivativeService, FsImageSource, RouterConfig};

use super::test_utils::{
    create_test_jpeg, create_test_png, decoded_dimensions, is_valid_jpeg, MemorySource,
};

/// Build a router over a temp directory holding the given files.
fn fs_router(files: &[(&str, Vec<u8>)]) -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    for (name, data) in files {
        std::fs::write(dir.path().join(name), data).unwrap();
    }
    let source = Arc::new(FsImageSource::new(dir.path()));
    let service = DerivativeService::new(source);
    let router = create_router(service, RouterConfig::new().with_tracing(false));
    (dir, router)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// =============================================================================
// Derivative Retrieval
// =============================================================================

#[tokio::test]
async fn test_derivative_retrieval_with_width() {
    let (_dir, router) = fs_router(&[("a.jpg", create_test_jpeg(800, 600))]);

    let response = router.oneshot(get("/images/a.jpg?width=400")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=600"
    );
    assert_eq!(
        response.headers().get("x-image-cache-hit").unwrap(),
        "false"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_jpeg(&body));
    assert_eq!(decoded_dimensions(&body), (400, 300));
}

#[tokio::test]
async fn test_second_request_is_cache_hit_with_identical_bytes() {
    let (_dir, router) = fs_router(&[("a.jpg", create_test_jpeg(800, 600))]);

    let first = router
        .clone()
        .oneshot(get("/images/a.jpg?width=400"))
        .await
        .unwrap();
    assert_eq!(first.headers().get("x-image-cache-hit").unwrap(), "false");
    let first_body = first.into_body().collect().await.unwrap().to_bytes();

    let second = router.oneshot(get("/images/a.jpg?width=400")).await.unwrap();
    assert_eq!(second.headers().get("x-image-cache-hit").unwrap(), "true");
    let second_body = second.into_body().collect().await.unwrap().to_bytes();

    assert_eq!(first_body, second_body);
}

#[tokio::test]
async fn test_missing_width_uses_default_and_shares_key_with_explicit() {
    let (_dir, router) = fs_router(&[("a.jpg", create_test_jpeg(1600, 1200))]);

    // No width parameter: derivative at the default width (800).
    let response = router.clone().oneshot(get("/images/a.jpg")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(decoded_dimensions(&body).0, 800);

    // An explicit width=800 request hits the same cache entry.
    let response = router.oneshot(get("/images/a.jpg?width=800")).await.unwrap();
    assert_eq!(response.headers().get("x-image-cache-hit").unwrap(), "true");
}

#[tokio::test]
async fn test_malformed_width_falls_back_to_default() {
    let (_dir, router) = fs_router(&[("a.jpg", create_test_jpeg(1600, 1200))]);

    for uri in [
        "/images/a.jpg?width=banana",
        "/images/a.jpg?width=-5",
        "/images/a.jpg?width=0",
        "/images/a.jpg?width=",
    ] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(decoded_dimensions(&body).0, 800, "{}", uri);
    }
}

#[tokio::test]
async fn test_png_source_served_as_jpeg() {
    let (_dir, router) = fs_router(&[("logo.png", create_test_png(640, 480))]);

    let response = router
        .oneshot(get("/images/logo.png?width=320"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_jpeg(&body));
}

#[tokio::test]
async fn test_non_raster_passthrough() {
    let svg = b"<svg xmlns='http://www.w3.org/2000/svg'/>".to_vec();
    let (_dir, router) = fs_router(&[("icon.svg", svg.clone())]);

    let response = router
        .oneshot(get("/images/icon.svg?width=400"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/svg+xml"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], &svg[..]);
}

#[tokio::test]
async fn test_compressible_responses_are_gzip_encoded() {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg'>{}</svg>",
        "<rect width='10' height='10'/>".repeat(20)
    )
    .into_bytes();
    let (_dir, router) = fs_router(&[("icon.svg", svg), ("a.jpg", create_test_jpeg(400, 300))]);

    let request = Request::builder()
        .uri("/images/icon.svg")
        .header("accept-encoding", "gzip")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-encoding").unwrap(),
        "gzip"
    );

    // Raster payloads are already compressed and go out as-is.
    let request = Request::builder()
        .uri("/images/a.jpg?width=200")
        .header("accept-encoding", "gzip")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("content-encoding").is_none());
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_missing_image_returns_404() {
    let (_dir, router) = fs_router(&[("a.jpg", create_test_jpeg(100, 100))]);

    let response = router.oneshot(get("/images/missing.jpg")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_corrupt_image_returns_500_with_generic_message() {
    let (_dir, router) = fs_router(&[("broken.jpg", vec![0x00, 0x01, 0x02, 0x03])]);

    let response = router.oneshot(get("/images/broken.jpg")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "processing_error");

    // Internal decode detail must not leak to clients.
    let message = json["message"].as_str().unwrap();
    assert_eq!(message, "Failed to process image");
}

#[tokio::test]
async fn test_failed_request_does_not_poison_subsequent_requests() {
    let source = Arc::new(
        MemorySource::new()
            .with_asset("broken.jpg", vec![0u8; 8])
            .with_asset("good.jpg", create_test_jpeg(400, 300)),
    );
    let service = DerivativeService::new(source);
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    let response = router
        .clone()
        .oneshot(get("/images/broken.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Unrelated keys are unaffected and the failed key is retryable.
    let response = router.clone().oneshot(get("/images/good.jpg")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router.oneshot(get("/images/broken.jpg")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Health and Static Files
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, router) = fs_router(&[]);

    let response = router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_static_file_serving() {
    let static_dir = tempfile::tempdir().unwrap();
    std::fs::write(static_dir.path().join("index.html"), b"<h1>hello</h1>").unwrap();

    let image_dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FsImageSource::new(image_dir.path()));
    let service = DerivativeService::new(source);
    let router = create_router(
        service,
        RouterConfig::new()
            .with_static_dir(static_dir.path())
            .with_tracing(false),
    );

    let response = router.oneshot(get("/index.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"<h1>hello</h1>");
}
