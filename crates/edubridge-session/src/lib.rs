//! Expiring session cache for authenticated portal handles.
//!
//! This crate provides the process-wide store that maps opaque session
//! tokens to authenticated values:
//! - Random, high-entropy [`SessionToken`]s minted on insertion
//! - Per-entry time-to-live, absolute (from creation) or sliding (from last use)
//! - A hard capacity bound with expired-first, then LRU eviction
//! - An optional background sweep of expired entries
//!
//! # Example
//!
//! ```rust,ignore
//! use edubridge_session::{SessionCache, CacheConfig};
//!
//! let config = CacheConfig::default()
//!     .with_max_sessions(2000)
//!     .with_ttl(Duration::from_secs(2 * 60 * 60));
//!
//! let cache = SessionCache::new(config);
//! let token = cache.create(handle).await;
//! assert!(cache.lookup(token.as_str()).await.is_some());
//! ```

mod cache;
mod config;
mod error;
mod token;
mod ttl;

pub use cache::{CacheStats, SessionCache};
pub use config::{CacheConfig, ExpiryPolicy};
pub use error::{Error, Result};
pub use token::SessionToken;
pub use ttl::TtlTracker;
