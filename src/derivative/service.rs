//! Derivative service: cache lookup with request coalescing.
//!
//! The service sits between the HTTP layer and the pipeline:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             DerivativeService               │
//! │  ┌────────────────┐   ┌──────────────────┐  │
//! │  │ DerivativeCache│   │ in-flight map    │  │
//! │  │ (LRU + TTL)    │   │ (one per key)    │  │
//! │  └────────────────┘   └──────────────────┘  │
//! └──────────────────────┬──────────────────────┘
//!                        │
//!                        ▼
//!              ┌───────────────────┐
//!              │ DerivativePipeline │
//!              └───────────────────┘
//! ```
//!
//! For any key, at most one pipeline invocation is in flight at a time.
//! The first requester becomes the leader and spawns the production on a
//! detached task; everyone else attaches to the same in-flight state and
//! receives the same outcome. Because the task is detached, a client that
//! disconnects mid-request never cancels work other waiters share; the
//! result still lands in the cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use crate::error::DerivativeError;
use crate::source::ImageSource;

use super::cache::{DerivativeCache, DEFAULT_CACHE_ENTRIES, DEFAULT_CACHE_TTL};
use super::key::DerivativeKey;
use super::pipeline::{Derivative, DerivativePipeline, DEFAULT_JPEG_QUALITY};

// =============================================================================
// Response
// =============================================================================

/// Outcome of a derivative fetch.
#[derive(Debug, Clone)]
pub struct DerivativeResponse {
    /// Derivative payload
    pub data: Bytes,

    /// MIME type to serve the payload with
    pub content_type: &'static str,

    /// Whether the payload came from the cache
    pub cache_hit: bool,
}

// =============================================================================
// In-flight state
// =============================================================================

/// Shared state for one in-flight production.
///
/// Exactly one of these exists per key while production runs; it is removed
/// from the map the moment the result is recorded, so it never lingers
/// after settling.
struct InFlightState {
    /// Wakes waiters once the result is available
    notify: Notify,

    /// Terminal outcome, set exactly once
    result: Mutex<Option<Result<Derivative, DerivativeError>>>,
}

// =============================================================================
// DerivativeService
// =============================================================================

/// Cache-backed, coalescing front end for derivative production.
///
/// Cloneable via `Arc`; one instance serves all requests.
pub struct DerivativeService<S: ImageSource + 'static> {
    pipeline: Arc<DerivativePipeline<S>>,
    cache: Arc<DerivativeCache>,
    in_flight: Arc<Mutex<HashMap<DerivativeKey, Arc<InFlightState>>>>,
}

impl<S: ImageSource + 'static> DerivativeService<S> {
    /// Create a service with default cache limits and output quality.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_limits(
            source,
            DEFAULT_CACHE_ENTRIES,
            DEFAULT_CACHE_TTL,
            DEFAULT_JPEG_QUALITY,
        )
    }

    /// Create a service with explicit cache capacity, TTL, and quality.
    pub fn with_limits(
        source: Arc<S>,
        cache_entries: usize,
        cache_ttl: Duration,
        quality: u8,
    ) -> Self {
        Self {
            pipeline: Arc::new(DerivativePipeline::with_quality(source, quality)),
            cache: Arc::new(DerivativeCache::with_limits(cache_entries, cache_ttl)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The derivative cache, for introspection.
    pub fn cache(&self) -> &DerivativeCache {
        &self.cache
    }

    /// Number of productions currently in flight.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Fetch a derivative, producing it at most once per key.
    ///
    /// 1. Cache hit: return immediately, no pipeline call.
    /// 2. Miss with a production already in flight: await its outcome.
    /// 3. Miss otherwise: become the leader, spawn the production, cache
    ///    the result, and resolve every waiter with the same outcome.
    ///
    /// A failed production caches nothing and clears the in-flight entry,
    /// so the next fetch for the key starts fresh.
    pub async fn get_derivative(
        &self,
        source_id: &str,
        width: u32,
    ) -> Result<DerivativeResponse, DerivativeError> {
        let key = DerivativeKey::new(source_id, width);

        if let Some(derivative) = self.cache.get(&key).await {
            debug!(source_id, width, "derivative cache hit");
            return Ok(DerivativeResponse {
                data: derivative.data,
                content_type: derivative.content_type,
                cache_hit: true,
            });
        }

        let state = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(state) = in_flight.get(&key) {
                debug!(source_id, width, "joining in-flight production");
                state.clone()
            } else {
                let state = Arc::new(InFlightState {
                    notify: Notify::new(),
                    result: Mutex::new(None),
                });
                in_flight.insert(key.clone(), state.clone());
                self.spawn_production(key.clone(), state.clone());
                state
            }
        };

        self.await_in_flight(&state).await.map(|derivative| {
            DerivativeResponse {
                data: derivative.data,
                content_type: derivative.content_type,
                cache_hit: false,
            }
        })
    }

    /// Run the pipeline on a detached task that resolves the in-flight
    /// state. Detachment keeps the work alive when the requester that
    /// triggered it goes away.
    fn spawn_production(&self, key: DerivativeKey, state: Arc<InFlightState>) {
        let pipeline = self.pipeline.clone();
        let cache = self.cache.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let result = pipeline.produce(&key.source_id, key.width).await;

            match &result {
                Ok(derivative) => {
                    cache.put(key.clone(), derivative.clone()).await;
                }
                Err(e) => {
                    warn!(source_id = %key.source_id, width = key.width,
                          "derivative production failed: {}", e);
                }
            }

            {
                let mut result_guard = state.result.lock().await;
                *result_guard = Some(result);
            }

            // Remove the pending entry before waking waiters so a retry
            // after failure starts a fresh production.
            in_flight.lock().await.remove(&key);
            state.notify.notify_waiters();
        });
    }

    /// Wait for an in-flight production to settle and clone its outcome.
    async fn await_in_flight(
        &self,
        state: &InFlightState,
    ) -> Result<Derivative, DerivativeError> {
        loop {
            // Register for notification before checking the result, so a
            // resolution landing in between cannot be missed.
            let notified = state.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let result_guard = state.result.lock().await;
                if let Some(result) = result_guard.as_ref() {
                    return result.clone();
                }
            }

            notified.await;
        }
    }
}

impl<S: ImageSource + 'static> Clone for DerivativeService<S> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            cache: Arc::clone(&self.cache),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
