//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use edubridge_portal::{FixturePortal, PortalFixture};
use edubridge_server::{Server, ServerConfig, TOKEN_HEADER};

/// Username of the first sample account.
pub const USERNAME: &str = "ada.lovelace";
/// Password of the first sample account.
pub const PASSWORD: &str = "analytical";
/// School of the sample accounts.
pub const SUBDOMAIN: &str = "demo";

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server.
    pub client: Client,
    /// The portal behind the server, for inspecting side effects.
    pub portal: FixturePortal,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server backed by the sample school.
    pub async fn start() -> Result<Self> {
        Self::start_with(PortalFixture::sample()?, |config| config).await
    }

    /// Start a test server with a custom dataset and config tweaks.
    pub async fn start_with(
        fixture: PortalFixture,
        configure: impl FnOnce(ServerConfig) -> ServerConfig,
    ) -> Result<Self> {
        let addr = find_available_port().await?;
        let portal = FixturePortal::new(fixture);

        let config = configure(
            ServerConfig::new()
                .with_bind_address(addr)
                .with_rate_limiting(false)
                .with_request_logging(false),
        );

        let server = Server::new(Arc::new(portal.clone()), config);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            portal,
            _handle: handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL for a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Log in with the sample account and return the session token.
    pub async fn login(&self) -> Result<String> {
        self.login_as(USERNAME, PASSWORD).await
    }

    /// Log in with explicit credentials and return the session token.
    pub async fn login_as(&self, username: &str, password: &str) -> Result<String> {
        let resp = self
            .client
            .post(self.url("/authenticate"))
            .json(&json!({
                "username": username,
                "password": password,
                "subdomain": SUBDOMAIN,
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = resp.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("no token in response: {}", body))
    }

    /// GET with a session token.
    pub fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).header(TOKEN_HEADER, token)
    }

    /// POST with a session token.
    pub fn post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).header(TOKEN_HEADER, token)
    }

    /// DELETE with a session token.
    pub fn delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).header(TOKEN_HEADER, token)
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.status().is_success())
    }
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let ready = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match ready {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
