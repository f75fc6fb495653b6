//! Bounded in-memory cache for computed derivatives.
//!
//! The cache combines two independent expiry mechanisms:
//!
//! - **Capacity**: at most a fixed number of entries; inserting past the
//!   limit evicts the least-recently-accessed entry.
//! - **TTL**: an entry older than the configured time-to-live is treated as
//!   absent. Expiry is checked lazily on read and opportunistically during
//!   capacity-driven eviction, so no background timer is needed.
//!
//! All operations are pure map/metadata mutation; the lock is never held
//! across I/O or transcoding work.

use std::time::Duration;

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::key::DerivativeKey;
use super::pipeline::Derivative;

/// Default maximum number of cached derivatives.
pub const DEFAULT_CACHE_ENTRIES: usize = 256;

/// Default entry time-to-live.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// A cached derivative with its creation timestamp.
struct Entry {
    data: Bytes,
    content_type: &'static str,
    created_at: Instant,
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

// =============================================================================
// DerivativeCache
// =============================================================================

/// LRU + TTL cache mapping derivative keys to encoded payloads.
///
/// Thread-safe; shared across request handlers via `Arc`.
pub struct DerivativeCache {
    entries: RwLock<LruCache<DerivativeKey, Entry>>,
    ttl: Duration,
}

impl DerivativeCache {
    /// Create a cache with the default capacity and TTL.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CACHE_ENTRIES, DEFAULT_CACHE_TTL)
    }

    /// Create a cache bounded to `max_entries` with the given TTL.
    pub fn with_limits(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(
                std::num::NonZeroUsize::new(max_entries).unwrap(),
            )),
            ttl,
        }
    }

    /// Get a derivative, marking it recently used.
    ///
    /// An entry past its TTL is removed and reported as absent, so nothing
    /// is ever served stale.
    pub async fn get(&self, key: &DerivativeKey) -> Option<Derivative> {
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.peek(key) {
            if entry.is_expired(self.ttl) {
                entries.pop(key);
                return None;
            }
        }

        entries.get(key).map(|entry| Derivative {
            data: entry.data.clone(),
            content_type: entry.content_type,
        })
    }

    /// Store a derivative, stamping its creation time to now.
    ///
    /// When the cache is full, expired entries are dropped first; if none
    /// exist the least-recently-accessed entry is evicted by the insert
    /// itself.
    pub async fn put(&self, key: DerivativeKey, derivative: Derivative) {
        let mut entries = self.entries.write().await;

        if entries.len() == entries.cap().get() && !entries.contains(&key) {
            let expired: Vec<DerivativeKey> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(self.ttl))
                .map(|(key, _)| key.clone())
                .collect();
            for key in expired {
                entries.pop(&key);
            }
        }

        entries.put(
            key,
            Entry {
                data: derivative.data,
                content_type: derivative.content_type,
                created_at: Instant::now(),
            },
        );
    }

    /// Check for a live entry without updating LRU order.
    pub async fn contains(&self, key: &DerivativeKey) -> bool {
        let entries = self.entries.read().await;
        match entries.peek(key) {
            Some(entry) => !entry.is_expired(self.ttl),
            None => false,
        }
    }

    /// Current number of entries (live or not yet swept).
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        let entries = self.entries.read().await;
        entries.is_empty()
    }

    /// Remove all entries.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Maximum number of entries.
    pub async fn capacity(&self) -> usize {
        let entries = self.entries.read().await;
        entries.cap().get()
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for DerivativeCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
