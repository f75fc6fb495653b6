//! HTTP request handlers for the imagemill API.
//!
//! # Endpoints
//!
//! - `GET /images/{filename}?width={int}` - Serve a width-adapted derivative
//! - `GET /health` - Health check endpoint

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::derivative::{normalize_width, DerivativeService};
use crate::error::DerivativeError;
use crate::source::ImageSource;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to all handlers via Axum's State
/// extractor. The service instance is constructed once at startup and
/// handed in explicitly; there is no ambient global.
pub struct AppState<S: ImageSource + 'static> {
    /// The derivative service handling cache + production
    pub service: DerivativeService<S>,

    /// Width substituted when a request carries no usable width parameter
    pub default_width: u32,

    /// Cache-Control max-age in seconds for derivative responses
    pub cache_max_age: u32,
}

impl<S: ImageSource + 'static> AppState<S> {
    /// Create application state with the given service and defaults.
    pub fn new(service: DerivativeService<S>, default_width: u32, cache_max_age: u32) -> Self {
        Self {
            service,
            default_width,
            cache_max_age,
        }
    }
}

impl<S: ImageSource + 'static> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            default_width: self.default_width,
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for derivative requests.
///
/// `width` is kept as a raw string: a missing, malformed, or non-positive
/// value silently falls back to the configured default rather than failing
/// the request.
#[derive(Debug, Deserialize)]
pub struct ImageQueryParams {
    /// Requested output width in pixels
    #[serde(default)]
    pub width: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "processing_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert DerivativeError to an HTTP response.
///
/// Only "not found" is surfaced to clients with detail; every other
/// failure becomes a generic 500 so internal error text never leaks. Full
/// detail goes to the log instead.
impl IntoResponse for DerivativeError {
    fn into_response(self) -> Response {
        if self.is_not_found() {
            debug!(status = 404, "image not found: {}", self);
            let body = ErrorResponse::new("not_found", "Image not found");
            return (StatusCode::NOT_FOUND, Json(body)).into_response();
        }

        error!(status = 500, "derivative request failed: {}", self);
        let body = ErrorResponse::new("processing_error", "Failed to process image");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle derivative requests.
///
/// # Endpoint
///
/// `GET /images/{filename}?width={int}`
///
/// # Response
///
/// - `200 OK`: derivative bytes with their content type
/// - `404 Not Found`: source image does not exist
/// - `500 Internal Server Error`: processing failure (generic message)
///
/// # Headers
///
/// - `Content-Type`: `image/jpeg` for transcoded derivatives, the source's
///   native type for passthrough files
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `X-Image-Cache-Hit: true|false`
pub async fn image_handler<S: ImageSource + 'static>(
    State(state): State<AppState<S>>,
    Path(filename): Path<String>,
    Query(query): Query<ImageQueryParams>,
) -> Result<Response, DerivativeError> {
    let width = normalize_width(query.width.as_deref(), state.default_width);

    let response = state.service.get_derivative(&filename, width).await?;

    debug!(
        filename,
        width,
        cache_hit = response.cache_hit,
        bytes = response.data.len(),
        "serving derivative"
    );

    let http_response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, response.content_type)
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        )
        .header("X-Image-Cache-Hit", response.cache_hit.to_string())
        .body(axum::body::Body::from(response.data))
        .map_err(|e| DerivativeError::Internal {
            message: format!("failed to build response: {}", e),
        })?;

    Ok(http_response)
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
