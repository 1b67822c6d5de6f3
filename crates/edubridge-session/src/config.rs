//! Configuration for the session cache.

use std::time::Duration;

/// Default maximum number of live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 2_000;

/// Default session lifetime (2 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Default interval between background sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// How an entry's time window is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// The window starts at insertion and is never extended.
    #[default]
    Absolute,
    /// The window restarts on every successful lookup.
    Sliding,
}

/// Configuration for the session cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction kicks in.
    pub max_sessions: usize,

    /// Lifetime of an entry.
    pub ttl: Duration,

    /// Whether lookups extend the lifetime.
    pub expiry: ExpiryPolicy,

    /// Whether to run periodic cleanup of expired entries.
    /// If false, expired entries are only dropped on access or on overflow.
    pub enable_cleanup_task: bool,

    /// Interval for the cleanup task (if enabled).
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            ttl: DEFAULT_TTL,
            expiry: ExpiryPolicy::Absolute,
            enable_cleanup_task: true,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the entry lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the expiry policy.
    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    /// Enable or disable the background cleanup task.
    pub fn with_cleanup_task(mut self, enabled: bool) -> Self {
        self.enable_cleanup_task = enabled;
        self
    }

    /// Set the cleanup interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}
