use std::net::SocketAddr;
use std::time::Duration;

use shared::config::{env_list, env_or, env_parse, ConfigError, ConfigResult};
use shared::database::DatabaseConfig;
use shared::storage::StorageConfig;

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Largest accepted request body, uploads included.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout: Duration::from_secs(30),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            addr: parse_listen_addr(&env_or("SERVER_ADDR", &defaults.addr.to_string()))?,
            request_timeout: Duration::from_secs(env_parse(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout.as_secs(),
            )?),
            max_body_bytes: env_parse("MAX_BODY_BYTES", defaults.max_body_bytes)?,
            cors_allowed_origins: env_list("CORS_ALLOWED_ORIGINS", &DEFAULT_ALLOWED_ORIGINS),
        })
    }
}

/// `host:port`, or `:port` to listen on every interface.
fn parse_listen_addr(raw: &str) -> ConfigResult<SocketAddr> {
    let raw = raw.trim();
    let qualified = match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => raw.to_string(),
    };

    qualified.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
        key: "SERVER_ADDR".to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

impl AppConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}
