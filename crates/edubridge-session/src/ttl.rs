//! TTL tracking for session expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::ExpiryPolicy;

/// Tracks when each entry's time window started.
#[derive(Debug)]
pub struct TtlTracker {
    /// Start of the current window for each key.
    started: HashMap<String, Instant>,

    /// Window length.
    ttl: Duration,

    /// Whether accesses restart the window.
    policy: ExpiryPolicy,
}

impl TtlTracker {
    /// Create a new tracker.
    pub fn new(ttl: Duration, policy: ExpiryPolicy) -> Self {
        Self {
            started: HashMap::new(),
            ttl,
            policy,
        }
    }

    /// Start (or restart) the window for a key, regardless of policy.
    pub fn start(&mut self, key: &str) {
        self.started.insert(key.to_string(), Instant::now());
    }

    /// Record an access. Only restarts the window under [`ExpiryPolicy::Sliding`].
    pub fn touch(&mut self, key: &str) {
        if self.policy == ExpiryPolicy::Sliding
            && let Some(started) = self.started.get_mut(key)
        {
            *started = Instant::now();
        }
    }

    /// Check if a key has expired. Untracked keys count as expired.
    pub fn is_expired(&self, key: &str) -> bool {
        match self.started.get(key) {
            None => true,
            Some(started) => started.elapsed() >= self.ttl,
        }
    }

    /// Remove tracking for a key.
    pub fn remove(&mut self, key: &str) {
        self.started.remove(key);
    }

    /// Get all expired keys.
    pub fn get_expired(&self) -> Vec<String> {
        let now = Instant::now();
        self.started
            .iter()
            .filter(|(_, started)| now.duration_since(**started) >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Remove all expired entries and return their keys.
    pub fn drain_expired(&mut self) -> Vec<String> {
        let expired = self.get_expired();
        for key in &expired {
            self.started.remove(key);
        }
        expired
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.started.len()
    }

    /// Check if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}
