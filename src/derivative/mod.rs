//! Derivative computation and caching.
//!
//! This is the core of the crate: given `(source image, requested width)`
//! it returns width-adapted bytes, computing them at most once even under
//! concurrent demand and keeping results in a bounded LRU + TTL cache.
//!
//! # Components
//!
//! - [`DerivativeKey`] / [`normalize_width`]: canonical cache keys
//! - [`DerivativeCache`]: bounded key→bytes store with LRU eviction and
//!   per-entry TTL
//! - [`DerivativePipeline`]: read → resize → re-encode (or passthrough)
//! - [`DerivativeService`]: cache lookup with request coalescing; the
//!   entry point the HTTP layer calls
//!
//! # Data flow
//!
//! request → key → service checks cache → on miss the pipeline runs once
//! → result cached and fanned out to all waiters.

mod cache;
mod key;
mod pipeline;
mod service;

pub use cache::{DerivativeCache, DEFAULT_CACHE_ENTRIES, DEFAULT_CACHE_TTL};
pub use key::{normalize_width, DerivativeKey, DEFAULT_WIDTH};
pub use pipeline::{Derivative, DerivativePipeline, DEFAULT_JPEG_QUALITY, OUTPUT_CONTENT_TYPE};
pub use service::{DerivativeResponse, DerivativeService};
