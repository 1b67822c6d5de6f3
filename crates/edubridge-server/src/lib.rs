//! HTTP API for edubridge.
//!
//! This crate exposes a school portal as a small REST API. Clients log in
//! once, receive a session token, and send that token with every other
//! call.
//!
//! # Features
//!
//! - Token sessions with expiry, backed by `edubridge-session`
//! - An ordered guard pipeline in front of every session route
//! - Uniform JSON normalization of portal records
//! - Rate limiting on the authenticate endpoints
//! - Request logging
//! - OpenAPI document and Swagger UI
//!
//! # Example
//!
//! ```ignore
//! use edubridge_server::{Server, ServerConfig};
//! use edubridge_portal::{FixturePortal, PortalFixture};
//!
//! let portal = FixturePortal::new(PortalFixture::sample()?);
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:8080".parse()?);
//!
//! let server = Server::new(Arc::new(portal), config);
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod ratelimit;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use normalize::Payload;
pub use pipeline::{
    Guard, GuardChain, GuardContext, GuardedState, LoginGuard, RequestContext, SessionGuard,
    TOKEN_HEADER, TokenGuard, guard_middleware,
};
pub use ratelimit::{rate_limit_middleware, request_logging_middleware};
pub use routes::{MessageRequest, PageParams, TokenResponse};
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
};
use edubridge_portal::PortalConnector;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The edubridge HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server for the given portal and configuration.
    pub fn new(portal: Arc<dyn PortalConnector>, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(portal, config),
        }
    }

    /// Application state shared with handlers.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(routes::health_routes())
            .merge(self.auth_routes())
            .merge(self.session_routes())
            .merge(self.portal_routes())
            .merge(routes::openapi::swagger_ui())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::request_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http());

        if let Some(cors) = self.cors_layer() {
            router = router.layer(cors);
        }

        router.with_state(self.state.clone())
    }

    /// Login routes, rate limited and unguarded.
    fn auth_routes(&self) -> Router<AppState> {
        Router::new()
            .route("/authenticate", post(routes::authenticate_handler))
            .route("/authenticate-auto", post(routes::authenticate_auto_handler))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::rate_limit_middleware,
            ))
    }

    /// Session management; the portal handle may already be logged out.
    fn session_routes(&self) -> Router<AppState> {
        Router::new()
            .route("/session", delete(routes::logout_handler))
            .route_layer(middleware::from_fn_with_state(
                GuardedState::new(self.state.clone(), GuardChain::session_only()),
                pipeline::guard_middleware,
            ))
    }

    /// Everything that talks to the portal on behalf of a session.
    fn portal_routes(&self) -> Router<AppState> {
        Router::new()
            .route("/timetable", get(routes::timetable_handler))
            .route("/timetable-changes", get(routes::timetable_changes_handler))
            .route("/foreign-timetable", get(routes::foreign_timetable_handler))
            .route("/next-ringing", get(routes::next_ringing_handler))
            .route("/students", get(routes::students_handler))
            .route("/teachers", get(routes::teachers_handler))
            .route("/missing-teachers", get(routes::missing_teachers_handler))
            .route("/message", post(routes::send_message_handler))
            .route(
                "/lunches",
                get(routes::get_lunches_handler)
                    .post(routes::choose_lunch_handler)
                    .delete(routes::sign_off_lunch_handler),
            )
            .route("/timeline", get(routes::timeline_handler))
            .route(
                "/cloud-upload",
                post(routes::cloud_upload_handler)
                    .layer(DefaultBodyLimit::max(self.state.config.max_upload_size)),
            )
            .route("/grades", get(routes::grades_handler))
            .route("/school-year", get(routes::school_year_handler))
            .route_layer(middleware::from_fn_with_state(
                GuardedState::new(self.state.clone(), GuardChain::standard()),
                pipeline::guard_middleware,
            ))
    }

    fn cors_layer(&self) -> Option<CorsLayer> {
        let origins: Vec<HeaderValue> = self
            .state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            return None;
        }

        Some(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([
                    HeaderName::from_static(TOKEN_HEADER),
                    axum::http::header::CONTENT_TYPE,
                ]),
        )
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        self.state.spawn_cleanup_tasks();
        let router = self.router();

        info!(portal = %self.state.portal.name(), "Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}
