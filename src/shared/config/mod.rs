//! Server configuration module
//!
//! Configuration is assembled in layers: built-in defaults, an optional TOML
//! file, then environment variables. The result is validated before use.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::shared::user::UserIdentity;

/// Smallest accepted HMAC secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PING_INTERVAL_SECS: u64 = 30;
const DEFAULT_PONG_TIMEOUT_SECS: u64 = 10;

/// Realtime server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: SocketAddr,
    /// SQLite URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// Secret shared with the login service for HS256 session tokens
    pub jwt_secret: String,
    /// Interval between server pings on idle connections
    pub ping_interval: Duration,
    /// How long to wait for a pong before closing
    pub pong_timeout: Duration,
    /// Accounts seeded into the user directory at startup
    pub users: Vec<UserIdentity>,
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load from the file named by `CHAT_CONFIG` (if set), then apply
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = match std::env::var("CHAT_CONFIG") {
            Ok(path) => ServerConfigBuilder::from_toml_file(path)?,
            Err(_) => ServerConfigBuilder::default(),
        };

        if let Ok(addr) = std::env::var("BIND_ADDR") {
            builder = builder.bind_addr(&addr)?;
        } else if let Ok(port) = std::env::var("SERVER_PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("SERVER_PORT '{port}' is not a port")))?;
            builder = builder.port(port);
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "jwt_secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.ping_interval.is_zero() || self.pong_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "ping interval and pong timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// On-disk representation; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind_addr: Option<String>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    ping_interval_secs: Option<u64>,
    pong_timeout_secs: Option<u64>,
    #[serde(default)]
    users: Vec<UserIdentity>,
}

/// Builder for ServerConfig
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    bind_addr: SocketAddr,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    ping_interval: Duration,
    pong_timeout: Duration,
    users: Vec<UserIdentity>,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000))),
            database_url: None,
            jwt_secret: None,
            ping_interval: Duration::from_secs(DEFAULT_PING_INTERVAL_SECS),
            pong_timeout: Duration::from_secs(DEFAULT_PONG_TIMEOUT_SECS),
            users: Vec::new(),
        }
    }
}

impl ServerConfigBuilder {
    /// Start from the values in a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(source)?;
        let mut builder = Self::default();

        if let Some(addr) = file.bind_addr {
            builder = builder.bind_addr(&addr)?;
        }
        if let Some(url) = file.database_url {
            builder = builder.database_url(url);
        }
        if let Some(secret) = file.jwt_secret {
            builder = builder.jwt_secret(secret);
        }
        if let Some(secs) = file.ping_interval_secs {
            builder = builder.ping_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = file.pong_timeout_secs {
            builder = builder.pong_timeout(Duration::from_secs(secs));
        }
        for user in file.users {
            builder = builder.user(user);
        }
        Ok(builder)
    }

    /// Start from the values in a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Set the listen address (`host:port`)
    pub fn bind_addr(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind_addr = addr
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("bind address '{addr}' is not host:port")))?;
        Ok(self)
    }

    /// Keep the host, change the port
    pub fn port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }

    /// Set the database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the session token secret
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn pong_timeout(mut self, timeout: Duration) -> Self {
        self.pong_timeout = timeout;
        self
    }

    /// Seed an account into the user directory
    pub fn user(mut self, user: UserIdentity) -> Self {
        self.users.push(user);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let config = ServerConfig {
            bind_addr: self.bind_addr,
            database_url: self.database_url,
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("jwt_secret"))?,
            ping_interval: self.ping_interval,
            pong_timeout: self.pong_timeout,
            users: self.users,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
