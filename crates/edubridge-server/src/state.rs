//! Application state shared across handlers.

use std::sync::Arc;

use edubridge_portal::{PortalConnector, SharedPortalSession, TimelineEvent};
use edubridge_session::{SessionCache, SessionToken};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::ratelimit::{SharedRateLimiter, create_rate_limiter};

/// Token → authenticated portal handle.
pub type SessionStore = SessionCache<SharedPortalSession>;

/// Token → notification feed fetched for that session.
pub type TimelineStore = SessionCache<Arc<Vec<TimelineEvent>>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Portal used to log in.
    pub portal: Arc<dyn PortalConnector>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Live sessions.
    pub sessions: SessionStore,

    /// Recently fetched notification feeds.
    pub timelines: TimelineStore,

    /// Limiter shared by the authenticate endpoints.
    pub auth_limiter: SharedRateLimiter,
}

impl AppState {
    /// Create a new application state.
    pub fn new(portal: Arc<dyn PortalConnector>, config: ServerConfig) -> Self {
        Self {
            portal,
            sessions: SessionCache::new(config.sessions.clone()),
            timelines: SessionCache::new(config.timeline_cache.clone()),
            auth_limiter: create_rate_limiter(config.auth_rpm),
            config: Arc::new(config),
        }
    }

    /// Start the background expiry sweeps of both caches.
    pub fn spawn_cleanup_tasks(&self) {
        let sessions = self.sessions.spawn_cleanup_task().is_some();
        let timelines = self.timelines.spawn_cleanup_task().is_some();
        debug!(sessions, timelines, "Cache cleanup tasks");
    }

    /// Register a freshly logged-in handle and mint its token.
    pub async fn open_session(&self, session: SharedPortalSession) -> SessionToken {
        let token = self.sessions.create(session).await;
        info!(token = %token.redacted(), portal = %self.portal.name(), "Session opened");
        token
    }

    /// Drop a session and anything cached for it.
    pub async fn close_session(&self, token: &SessionToken) -> bool {
        self.timelines.evict(token.as_str()).await;
        let closed = self.sessions.evict(token.as_str()).await.is_some();
        info!(token = %token.redacted(), closed, "Session closed");
        closed
    }

    /// The session's notification feed, served from cache while fresh.
    pub async fn notifications(
        &self,
        token: &SessionToken,
        session: &SharedPortalSession,
    ) -> Result<Arc<Vec<TimelineEvent>>> {
        if let Some(feed) = self.timelines.lookup(token.as_str()).await {
            debug!(token = %token.redacted(), "Timeline cache hit");
            return Ok(feed);
        }

        let feed = Arc::new(session.get_notifications().await?);
        self.timelines.insert(token.as_str(), Arc::clone(&feed)).await;
        debug!(token = %token.redacted(), events = feed.len(), "Timeline fetched");
        Ok(feed)
    }
}
