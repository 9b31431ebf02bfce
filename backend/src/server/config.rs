//! Application configuration loaded once at startup.
//!
//! Configuration is an explicitly constructed value handed to the server
//! builder; components never read the environment themselves.

use std::env;
use std::io;
use std::net::SocketAddr;

use chrono::Duration;
use tracing::warn;
use uuid::Uuid;

/// Default bind address when `BIND_ADDR` is unset.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Default access-token lifetime in seconds when `TOKEN_TTL_SECS` is unset.
const DEFAULT_TOKEN_TTL_SECS: i64 = 900;

/// Startup configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection URL; when absent the in-memory store is used.
    pub database_url: Option<String>,
    /// Secret used to sign and verify access tokens.
    pub token_secret: String,
    /// Access-token lifetime.
    pub token_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Release builds refuse to start without `TOKEN_SECRET`; debug builds
    /// (or `TOKEN_ALLOW_EPHEMERAL=1`) fall back to a generated secret, which
    /// invalidates all tokens on restart.
    pub fn from_env() -> io::Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned())
            .parse()
            .map_err(|err| io::Error::other(format!("invalid BIND_ADDR: {err}")))?;

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let token_secret = match env::var("TOKEN_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                let allow_dev =
                    env::var("TOKEN_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
                if cfg!(debug_assertions) || allow_dev {
                    warn!("using ephemeral token secret (dev only); tokens die with the process");
                    Uuid::new_v4().to_string()
                } else {
                    return Err(io::Error::other(
                        "TOKEN_SECRET must be set in release builds",
                    ));
                }
            }
        };

        let token_ttl_secs = match env::var("TOKEN_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|err| io::Error::other(format!("invalid TOKEN_TTL_SECS: {err}")))?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        Ok(Self {
            bind_addr,
            database_url,
            token_secret,
            token_ttl: Duration::seconds(token_ttl_secs),
        })
    }
}
