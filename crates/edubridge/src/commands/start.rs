//! Start command - launches the edubridge server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use edubridge_config::EdubridgeConfig;
use edubridge_portal::{FixturePortal, PortalFixture};
use edubridge_server::{Server, ServerConfig};
use edubridge_session::{CacheConfig, ExpiryPolicy};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// School dataset to serve (overrides config)
    #[arg(long)]
    pub fixture: Option<PathBuf>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    if ctx.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    let config = &loaded.config;
    let addr = bind_address(config, &args)?;

    let fixture_path = args
        .fixture
        .clone()
        .or_else(|| config.portal.as_ref().and_then(|p| p.fixture.clone()));
    let fixture = match fixture_path {
        Some(ref path) => PortalFixture::load(path)
            .with_context(|| format!("failed to load school data from {}", path.display()))?,
        None => PortalFixture::sample()?,
    };

    info!(
        accounts = fixture.accounts.len(),
        students = fixture.students.len(),
        teachers = fixture.teachers.len(),
        source = %fixture_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in sample".to_string()),
        "Loaded school data"
    );

    let portal = FixturePortal::new(fixture);
    let server = Server::new(Arc::new(portal), server_config(config, addr));

    println!("edubridge listening on http://{}", addr);
    println!("API docs at http://{}/api/docs", addr);

    server.run().await?;
    Ok(())
}

/// Resolve the listen address from CLI flags, then config, then defaults.
fn bind_address(config: &EdubridgeConfig, args: &StartArgs) -> Result<SocketAddr> {
    let server = config.server.clone().unwrap_or_default();
    let bind = args.bind.clone().unwrap_or(server.bind);
    let port = args.port.unwrap_or(server.port);

    format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("invalid bind address '{}:{}'", bind, port))
}

/// Translate the file configuration into the server's runtime configuration.
fn server_config(config: &EdubridgeConfig, addr: SocketAddr) -> ServerConfig {
    let server = config.server.clone().unwrap_or_default();
    let session = config.session.clone().unwrap_or_default();
    let timeline = config.timeline.clone().unwrap_or_default();

    let expiry = if session.sliding {
        ExpiryPolicy::Sliding
    } else {
        ExpiryPolicy::Absolute
    };
    let cleanup_interval = Duration::from_secs(session.cleanup_interval_secs);

    ServerConfig::new()
        .with_bind_address(addr)
        .with_rate_limiting(server.rate_limiting)
        .with_auth_rpm(server.auth_rpm)
        .with_request_logging(server.request_logging)
        .with_max_upload_size(server.max_upload_size)
        .with_cors_origins(server.cors_origins)
        .with_sessions(
            CacheConfig::new()
                .with_max_sessions(session.max_sessions)
                .with_ttl(Duration::from_secs(session.ttl_secs))
                .with_expiry(expiry)
                .with_cleanup_interval(cleanup_interval),
        )
        .with_timeline_cache(
            CacheConfig::new()
                .with_max_sessions(timeline.cache_capacity)
                .with_ttl(Duration::from_secs(timeline.cache_ttl_secs))
                .with_cleanup_interval(cleanup_interval),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(port: Option<u16>, bind: Option<&str>) -> StartArgs {
        StartArgs {
            port,
            bind: bind.map(str::to_string),
            fixture: None,
        }
    }

    #[test]
    fn test_bind_address_defaults() {
        let addr = bind_address(&EdubridgeConfig::new(), &args(None, None)).unwrap();
        assert_eq!(addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = EdubridgeConfig::from_toml("[server]\nbind = \"0.0.0.0\"\nport = 9000").unwrap();

        let addr = bind_address(&config, &args(None, None)).unwrap();
        assert_eq!(addr, "0.0.0.0:9000".parse().unwrap());

        let addr = bind_address(&config, &args(Some(3000), Some("127.0.0.1"))).unwrap();
        assert_eq!(addr, "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn test_invalid_bind_address() {
        let err = bind_address(&EdubridgeConfig::new(), &args(None, Some("not an ip"))).unwrap_err();
        assert!(err.to_string().contains("invalid bind address"));
    }

    #[test]
    fn test_server_config_from_file_values() {
        let config = EdubridgeConfig::from_toml(
            r#"
[server]
rate_limiting = false
auth_rpm = 12
max_upload_size = 2048
cors_origins = ["https://school.example.org"]

[session]
max_sessions = 50
ttl_secs = 600
sliding = true
cleanup_interval_secs = 15

[timeline]
cache_ttl_secs = 30
cache_capacity = 5
"#,
        )
        .unwrap();
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();

        let server = server_config(&config, addr);
        assert_eq!(server.bind_address, addr);
        assert!(!server.rate_limiting);
        assert_eq!(server.auth_rpm, 12);
        assert_eq!(server.max_upload_size, 2048);
        assert_eq!(server.cors_origins, vec!["https://school.example.org"]);

        assert_eq!(server.sessions.max_sessions, 50);
        assert_eq!(server.sessions.ttl, Duration::from_secs(600));
        assert_eq!(server.sessions.expiry, ExpiryPolicy::Sliding);
        assert_eq!(server.sessions.cleanup_interval, Duration::from_secs(15));

        assert_eq!(server.timeline_cache.max_sessions, 5);
        assert_eq!(server.timeline_cache.ttl, Duration::from_secs(30));
        assert_eq!(server.timeline_cache.expiry, ExpiryPolicy::Absolute);
    }

    #[test]
    fn test_server_config_defaults() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let server = server_config(&EdubridgeConfig::new(), addr);

        assert!(server.rate_limiting);
        assert_eq!(server.auth_rpm, 30);
        assert_eq!(server.sessions.ttl, Duration::from_secs(7200));
        assert_eq!(server.sessions.expiry, ExpiryPolicy::Absolute);
        assert_eq!(server.timeline_cache.ttl, Duration::from_secs(100));
        assert_eq!(server.timeline_cache.max_sessions, 20);
    }
}
