//! Environment-driven configuration for the lifecycle service.
//!
//! All knobs live under a `MEALBRIDGE_` prefix so the service can share an
//! environment with other processes without collisions. A `.env` file in the
//! working directory is honoured for local development.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_FILTER: &str = "info";

/// Top-level configuration for the lifecycle service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: BindConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Reads `MEALBRIDGE_HOST`, `MEALBRIDGE_PORT` and `MEALBRIDGE_LOG`,
    /// falling back to loopback defaults when a variable is unset.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = env_or("MEALBRIDGE_HOST", DEFAULT_HOST);
        let port = match env::var("MEALBRIDGE_PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { raw })?,
            Err(_) => DEFAULT_PORT,
        };
        let log_filter = env_or("MEALBRIDGE_LOG", DEFAULT_LOG_FILTER);

        Ok(Self {
            bind: BindConfig { host, port },
            telemetry: TelemetryConfig { log_filter },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Where the HTTP listener binds.
#[derive(Debug, Clone)]
pub struct BindConfig {
    pub host: String,
    pub port: u16,
}

impl BindConfig {
    /// Resolves the configured host into a socket address. Only `localhost`
    /// and literal IP addresses are accepted; hostnames would need a resolver
    /// this service deliberately does not carry.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(|source| ConfigError::InvalidHost {
            host: self.host.clone(),
            source,
        })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls. `log_filter` is an `EnvFilter` directive string.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_filter: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MEALBRIDGE_PORT '{raw}' is not a valid port number")]
    InvalidPort { raw: String },
    #[error("MEALBRIDGE_HOST '{host}' is neither 'localhost' nor an IP address")]
    InvalidHost {
        host: String,
        source: std::net::AddrParseError,
    },
}
