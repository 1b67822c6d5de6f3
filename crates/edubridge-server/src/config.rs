//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use edubridge_session::CacheConfig;

/// Default max body size for file uploads (10 MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Default authenticate calls per minute.
pub const DEFAULT_AUTH_RPM: u32 = 30;

/// Default lifetime of a cached notification feed.
pub const DEFAULT_TIMELINE_TTL: Duration = Duration::from_secs(100);

/// Default number of sessions whose feed is kept cached.
pub const DEFAULT_TIMELINE_CAPACITY: usize = 20;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Enable rate limiting on the authenticate endpoints.
    pub rate_limiting: bool,

    /// Rate limit: authenticate requests per minute.
    pub auth_rpm: u32,

    /// Enable request logging.
    pub request_logging: bool,

    /// CORS allowed origins (empty = no CORS).
    pub cors_origins: Vec<String>,

    /// Maximum body size accepted by `/cloud-upload`.
    pub max_upload_size: usize,

    /// Session token cache settings.
    pub sessions: CacheConfig,

    /// Per-session notification feed cache settings.
    pub timeline_cache: CacheConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            rate_limiting: true,
            auth_rpm: DEFAULT_AUTH_RPM,
            request_logging: true,
            cors_origins: Vec::new(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            sessions: CacheConfig::default(),
            timeline_cache: CacheConfig::default()
                .with_max_sessions(DEFAULT_TIMELINE_CAPACITY)
                .with_ttl(DEFAULT_TIMELINE_TTL),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Enable or disable rate limiting.
    pub fn with_rate_limiting(mut self, enabled: bool) -> Self {
        self.rate_limiting = enabled;
        self
    }

    /// Set the authenticate rate limit (requests per minute).
    pub fn with_auth_rpm(mut self, rpm: u32) -> Self {
        self.auth_rpm = rpm;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Set the maximum upload body size.
    pub fn with_max_upload_size(mut self, size: usize) -> Self {
        self.max_upload_size = size;
        self
    }

    /// Set the session cache configuration.
    pub fn with_sessions(mut self, sessions: CacheConfig) -> Self {
        self.sessions = sessions;
        self
    }

    /// Set the notification feed cache configuration.
    pub fn with_timeline_cache(mut self, timeline_cache: CacheConfig) -> Self {
        self.timeline_cache = timeline_cache;
        self
    }
}
