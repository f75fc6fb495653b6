//! # imagemill
//!
//! An on-demand image derivative server. Given an original image and a
//! requested width, imagemill returns a resized, re-encoded derivative,
//! computing it at most once per `(image, width)` pair even under
//! concurrent demand and keeping recent results in a bounded in-memory
//! cache.
//!
//! ## Features
//!
//! - **Derivative cache**: LRU eviction bounded by entry count, plus
//!   per-entry TTL expiry checked lazily on access
//! - **Request coalescing**: concurrent requests for the same derivative
//!   share one transcode; all waiters get the same bytes (or error)
//! - **Width-bounded resize**: downscale-only, aspect ratio preserved,
//!   re-encoded to JPEG at a fixed quality
//! - **Passthrough**: non-raster files (SVG, GIF, anything unknown) are
//!   served unchanged with their native content type
//! - **Static file serving** for the site the images belong to
//!
//! ## Architecture
//!
//! - [`source`] - storage abstraction and the filesystem implementation
//! - [`media`] - media kind detection from file extensions
//! - [`derivative`] - key building, cache, pipeline, and coalescing service
//! - [`server`] - Axum handlers and router
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use imagemill::{create_router, DerivativeService, FsImageSource, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(FsImageSource::new("public/images"));
//!     let service = DerivativeService::new(source);
//!     let router = create_router(service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod derivative;
pub mod error;
pub mod media;
pub mod server;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use derivative::{
    normalize_width, Derivative, DerivativeCache, DerivativeKey, DerivativePipeline,
    DerivativeResponse, DerivativeService, DEFAULT_CACHE_ENTRIES, DEFAULT_CACHE_TTL,
    DEFAULT_JPEG_QUALITY, DEFAULT_WIDTH, OUTPUT_CONTENT_TYPE,
};
pub use error::{DerivativeError, SourceError};
pub use media::MediaKind;
pub use server::{create_router, AppState, ErrorResponse, HealthResponse, RouterConfig};
pub use source::{FsImageSource, ImageSource};
