//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [server]                 # listener, rate limiting, uploads
//! [session]                # token cache size and expiry
//! [timeline]               # per-session notification cache
//! [portal]                 # which school portal to serve
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// Maps to the full TOML config file. All sections are optional so that
/// partial configs (e.g., project-local overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdubridgeConfig {
    /// HTTP server configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Session token cache configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,

    /// Notification feed cache configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineConfig>,

    /// Portal backend configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal: Option<PortalConfig>,
}

impl EdubridgeConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole; a layer that names `[session]` owns
    /// every session value.
    pub fn merge(&mut self, other: EdubridgeConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.session.is_some() {
            self.session = other.session;
        }

        if other.timeline.is_some() {
            self.timeline = other.timeline;
        }

        if other.portal.is_some() {
            self.portal = other.portal;
        }
    }

    /// Copy of this config with every section present, defaults filled in.
    pub fn resolved(&self) -> Self {
        Self {
            server: Some(self.server.clone().unwrap_or_default()),
            session: Some(self.session.clone().unwrap_or_default()),
            timeline: Some(self.timeline.clone().unwrap_or_default()),
            portal: Some(self.portal.clone().unwrap_or_default()),
        }
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref server) = self.server {
            if server.auth_rpm == 0 && server.rate_limiting {
                return Err(invalid(
                    "server.auth_rpm",
                    "must be positive when rate limiting is enabled",
                ));
            }
            if server.max_upload_size == 0 {
                return Err(invalid("server.max_upload_size", "must be positive"));
            }
        }

        if let Some(ref session) = self.session {
            if session.max_sessions == 0 {
                return Err(invalid("session.max_sessions", "must be positive"));
            }
            if session.ttl_secs == 0 {
                return Err(invalid("session.ttl_secs", "must be positive"));
            }
            if session.cleanup_interval_secs == 0 {
                return Err(invalid("session.cleanup_interval_secs", "must be positive"));
            }
        }

        if let Some(ref timeline) = self.timeline {
            if timeline.cache_capacity == 0 {
                return Err(invalid("timeline.cache_capacity", "must be positive"));
            }
            if timeline.cache_ttl_secs == 0 {
                return Err(invalid("timeline.cache_ttl_secs", "must be positive"));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Enable rate limiting on the authenticate endpoints.
    pub rate_limiting: bool,
    /// Login attempts allowed per minute.
    pub auth_rpm: u32,
    /// Enable request logging.
    pub request_logging: bool,
    /// Largest accepted cloud upload, in bytes.
    pub max_upload_size: usize,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            rate_limiting: true,
            auth_rpm: 30,
            request_logging: true,
            max_upload_size: 10 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of live sessions before the oldest is evicted.
    pub max_sessions: usize,
    /// Session lifetime in seconds.
    pub ttl_secs: u64,
    /// Restart the lifetime on every use instead of counting from login.
    pub sliding: bool,
    /// How often the background sweep drops expired sessions, in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 2000,
            ttl_secs: 2 * 60 * 60,
            sliding: false,
            cleanup_interval_secs: 60,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timeline Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Notification feed cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// How long a fetched feed is reused, in seconds.
    pub cache_ttl_secs: u64,
    /// Number of feeds kept at once.
    pub cache_capacity: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 100,
            cache_capacity: 20,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Portal Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Portal backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// JSON dataset served by the fixture portal; the built-in sample
    /// school when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
