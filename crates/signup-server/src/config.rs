//! Configuration for the signup service.

use anyhow::{Context, Result};
use crate::session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use serde::Deserialize;
use signup_core::provider::DEFAULT_MIN_PASSWORD_LENGTH;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Session lifetime configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Account provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Submissions per minute for a single session
    #[serde(default = "default_submit_rpm")]
    pub submit_per_minute: u32,

    /// Session openings and password-reset requests per minute, across all clients
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Age at which an unfinished session is closed
    #[serde(default = "default_session_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// Upper bound on open sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Delay between sweeps of expired sessions
    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    pub sweep_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Shortest password the account provider accepts
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl ServerConfig {
    /// Address to bind, failing on a malformed `listen_addr`.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address {:?}", self.listen_addr))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            submit_per_minute: default_submit_rpm(),
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: default_session_ttl(),
            max_sessions: default_max_sessions(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_submit_rpm() -> u32 {
    10
}

fn default_global_rpm() -> u32 {
    60
}

fn default_session_ttl() -> Duration {
    DEFAULT_SESSION_TTL
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_min_password_length() -> usize {
    DEFAULT_MIN_PASSWORD_LENGTH
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nested keys use `__`, e.g. `SERVER__PORT=9000`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rate_limit.submit_per_minute, 10);
        assert_eq!(config.rate_limit.global_per_minute, 60);
        assert_eq!(config.session.ttl, Duration::from_secs(30 * 60));
        assert_eq!(config.session.max_sessions, 10_000);
        assert_eq!(config.session.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.provider.min_password_length, 6);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"server": {"port": 9000}, "log": {}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.listen_addr, "0.0.0.0");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            listen_addr: "127.0.0.1".into(),
            port: 9000,
        };
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(
            ServerConfig::default().socket_addr().unwrap().to_string(),
            "0.0.0.0:8080"
        );
    }

    #[test]
    fn test_malformed_listen_addr_is_rejected() {
        let server = ServerConfig {
            listen_addr: "localhost:80".into(),
            port: 9000,
        };
        let err = server.socket_addr().unwrap_err();
        assert!(err.to_string().contains("localhost:80"));
    }

    #[test]
    fn test_session_durations_are_human_readable() {
        let config: Config =
            serde_json::from_str(r#"{"session": {"ttl": "5m", "sweep_interval": "10s"}}"#)
                .unwrap();
        assert_eq!(config.session.ttl, Duration::from_secs(300));
        assert_eq!(config.session.sweep_interval, Duration::from_secs(10));
        assert_eq!(config.session.max_sessions, 10_000);
    }
}
