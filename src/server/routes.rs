//! Router configuration for imagemill.
//!
//! # Route Structure
//!
//! ```text
//! /health                      - Health check
//! /images/{filename}?width=N   - Width-adapted derivative
//! /*                           - Static files (optional fallback)
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, image_handler, AppState};
use crate::derivative::DerivativeService;
use crate::source::ImageSource;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Width used when a request supplies none
    pub default_width: u32,

    /// Cache-Control max-age in seconds for derivative responses
    pub cache_max_age: u32,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Directory served as static files at the root (None = disabled)
    pub static_dir: Option<PathBuf>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a configuration with library defaults: default width 800,
    /// ten-minute cache max-age, any CORS origin, no static files,
    /// tracing on.
    pub fn new() -> Self {
        Self {
            default_width: crate::derivative::DEFAULT_WIDTH,
            cache_max_age: 600,
            cors_origins: None,
            static_dir: None,
            enable_tracing: true,
        }
    }

    /// Set the default derivative width.
    pub fn with_default_width(mut self, width: u32) -> Self {
        self.default_width = width;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Set specific allowed CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Serve static files from the given directory at the site root.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// Wires the derivative endpoint, the health check, optional static file
/// serving, CORS, response compression, and request tracing around the
/// given service.
pub fn create_router<S>(service: DerivativeService<S>, config: RouterConfig) -> Router
where
    S: ImageSource + 'static,
{
    let app_state = AppState::new(service, config.default_width, config.cache_max_age);

    let cors = build_cors_layer(&config);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/images/{filename}", get(image_handler::<S>))
        .with_state(app_state);

    if let Some(ref static_dir) = config.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    // Gzip for compressible responses (JSON, SVG, static text assets).
    // The default predicate skips already-compressed raster payloads.
    let router = router.layer(cors).layer(CompressionLayer::new());

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
