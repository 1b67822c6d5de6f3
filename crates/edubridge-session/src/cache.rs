//! Session cache with TTL expiry and LRU eviction.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::token::{SessionToken, redact};
use crate::ttl::TtlTracker;

/// Inner state protected by RwLock.
struct CacheInner<V> {
    /// Entries in recency order.
    lru: LruCache<String, V>,

    /// Expiry windows, one per entry in `lru`.
    ttl: TtlTracker,
}

impl<V> CacheInner<V> {
    /// Drop every expired entry and return how many were removed.
    fn purge_expired(&mut self) -> usize {
        let expired = self.ttl.drain_expired();
        let mut count = 0;
        for key in expired {
            if self.lru.pop(&key).is_some() {
                debug!(session = %redact(&key), "Dropping expired session");
                count += 1;
            }
        }
        count
    }

    /// Make room for one more entry under `capacity`.
    ///
    /// Expired entries go first; if the cache is still full the least
    /// recently used entry is evicted.
    fn reserve_slot(&mut self, key: &str, capacity: usize) {
        if self.lru.contains(key) || self.lru.len() < capacity {
            return;
        }

        self.purge_expired();

        while self.lru.len() >= capacity {
            match self.lru.pop_lru() {
                Some((evicted, _)) => {
                    debug!(session = %redact(&evicted), "Evicting LRU session to make room");
                    self.ttl.remove(&evicted);
                }
                None => break,
            }
        }
    }

    fn put(&mut self, key: &str, value: V, capacity: usize) {
        self.reserve_slot(key, capacity);
        self.lru.put(key.to_string(), value);
        self.ttl.start(key);
    }
}

/// Token-keyed cache with per-entry expiry and a capacity bound.
///
/// This cache provides:
/// - Token minting with collision re-roll ([`SessionCache::create`])
/// - Lazy expiry on lookup plus an optional periodic sweep
/// - Expired-first, then LRU eviction when at capacity
/// - Thread-safe access via RwLock; clones share the same store
///
/// Expired entries are never returned.
pub struct SessionCache<V> {
    inner: Arc<RwLock<CacheInner<V>>>,
    config: CacheConfig,
}

impl<V> SessionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new, empty cache.
    pub fn new(config: CacheConfig) -> Self {
        let capacity = config.max_sessions.max(1);
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        let inner = CacheInner {
            lru: LruCache::new(cap),
            ttl: TtlTracker::new(config.ttl, config.expiry),
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
            config,
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn capacity(&self) -> usize {
        self.config.max_sessions.max(1)
    }

    /// Get the current number of stored entries (expired ones included
    /// until they are swept).
    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    /// Store a value under a freshly generated token and return the token.
    pub async fn create(&self, value: V) -> SessionToken {
        let mut inner = self.inner.write().await;

        let mut token = SessionToken::generate();
        while inner.lru.contains(token.as_str()) {
            token = SessionToken::generate();
        }

        inner.put(token.as_str(), value, self.capacity());

        debug!(
            session = %token.redacted(),
            cache_size = inner.lru.len(),
            "Session created"
        );

        token
    }

    /// Store a value under a caller-chosen key, replacing any previous value
    /// and restarting its window.
    pub async fn insert(&self, key: &str, value: V) {
        let mut inner = self.inner.write().await;
        inner.put(key, value, self.capacity());

        trace!(
            session = %redact(key),
            cache_size = inner.lru.len(),
            "Entry inserted into cache"
        );
    }

    /// Fetch a live entry.
    ///
    /// Marks the entry as recently used and, under a sliding policy,
    /// restarts its window. An expired entry is removed and reported as
    /// [`Error::Expired`].
    pub async fn get(&self, key: &str) -> Result<V> {
        let mut inner = self.inner.write().await;

        if !inner.lru.contains(key) {
            return Err(Error::NotFound(redact(key).to_string()));
        }

        if inner.ttl.is_expired(key) {
            debug!(session = %redact(key), "Session expired, removing from cache");
            inner.lru.pop(key);
            inner.ttl.remove(key);
            return Err(Error::Expired(redact(key).to_string()));
        }

        inner.ttl.touch(key);
        match inner.lru.get(key) {
            Some(value) => {
                trace!(session = %redact(key), "Session found in cache");
                Ok(value.clone())
            }
            None => Err(Error::NotFound(redact(key).to_string())),
        }
    }

    /// Fetch a live entry, collapsing "unknown" and "expired" into `None`.
    pub async fn lookup(&self, key: &str) -> Option<V> {
        self.get(key).await.ok()
    }

    /// Check if a live entry exists, without touching recency or expiry.
    pub async fn contains(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        inner.lru.contains(key) && !inner.ttl.is_expired(key)
    }

    /// Remove an entry, returning its value if it was still live.
    pub async fn evict(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.write().await;
        let expired = inner.ttl.is_expired(key);
        inner.ttl.remove(key);
        let value = inner.lru.pop(key);

        if value.is_some() {
            debug!(session = %redact(key), "Session evicted");
        }

        if expired { None } else { value }
    }

    /// Drop all expired entries now.
    ///
    /// Runs periodically when the cleanup task is enabled, but can also be
    /// called manually.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let count = inner.purge_expired();

        if count > 0 {
            debug!(count = count, remaining = inner.ttl.len(), "Cleaned up expired sessions");
        }

        count
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            size: inner.lru.len(),
            capacity: self.capacity(),
            expired: inner.ttl.get_expired().len(),
        }
    }

    /// Spawn the periodic expiry sweep, if enabled.
    ///
    /// The task holds only a weak reference to the store and exits once
    /// every clone of the cache has been dropped.
    pub fn spawn_cleanup_task(&self) -> Option<JoinHandle<()>> {
        if !self.config.enable_cleanup_task {
            return None;
        }

        let weak = Arc::downgrade(&self.inner);
        let period = self
            .config
            .cleanup_interval
            .max(std::time::Duration::from_millis(1));

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    trace!("Session cache dropped, stopping cleanup task");
                    break;
                };
                let count = inner.write().await.purge_expired();
                if count > 0 {
                    debug!(count = count, "Background sweep removed expired sessions");
                }
            }
        }))
    }
}

impl<V> Clone for SessionCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of stored entries.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Entries whose window has elapsed but have not been swept yet.
    pub expired: usize,
}
