//! Server configuration
//!
//! Network-facing settings. Relay limits live in
//! [`RelayConfig`](roomcast_core::RelayConfig).

use roomcast_core::config::{parse_env, source_of};
use roomcast_core::{AppConfigTrait, ConfigError, ConfigSource};
use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default configuration values
pub struct ServerDefaults;

impl ServerDefaults {
    pub const BIND_ADDR: &'static str = "127.0.0.1:28080";
    pub const PUBLIC_DIR: &'static str = "./public";
    pub const MAX_REQUEST_SIZE: usize = 1024 * 1024;
    pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
}

pub const ENV_BIND: &str = "ROOMCAST_BIND";
pub const ENV_PUBLIC_DIR: &str = "ROOMCAST_PUBLIC_DIR";
pub const ENV_ADMIN_TOKEN: &str = "ROOMCAST_ADMIN_TOKEN";
pub const ENV_MAX_REQUEST_SIZE: &str = "ROOMCAST_MAX_REQUEST_SIZE";
pub const ENV_SHUTDOWN_TIMEOUT: &str = "ROOMCAST_SHUTDOWN_TIMEOUT_SECS";

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory served for paths no route claims
    pub public_dir: PathBuf,
    /// Admin token; when unset, the first `settoken` call claims it
    pub admin_token: Option<String>,
    pub max_request_size: usize,
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 28080)),
            public_dir: PathBuf::from(ServerDefaults::PUBLIC_DIR),
            admin_token: None,
            max_request_size: ServerDefaults::MAX_REQUEST_SIZE,
            shutdown_timeout_secs: ServerDefaults::SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    pub fn with_public_dir(mut self, public_dir: impl Into<PathBuf>) -> Self {
        self.public_dir = public_dir.into();
        self
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl AppConfigTrait for ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = parse_env(
            ENV_BIND,
            Self::default().bind_addr,
            "bind_addr",
            "socket address such as 127.0.0.1:28080",
        )?;

        let public_dir = env::var(ENV_PUBLIC_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(ServerDefaults::PUBLIC_DIR));

        let admin_token = env::var(ENV_ADMIN_TOKEN)
            .ok()
            .filter(|token| !token.is_empty());

        let config = Self {
            bind_addr,
            public_dir,
            admin_token,
            max_request_size: parse_env(
                ENV_MAX_REQUEST_SIZE,
                ServerDefaults::MAX_REQUEST_SIZE,
                "max_request_size",
                "positive number of bytes",
            )?,
            shutdown_timeout_secs: parse_env(
                ENV_SHUTDOWN_TIMEOUT,
                ServerDefaults::SHUTDOWN_TIMEOUT_SECS,
                "shutdown_timeout_secs",
                "number of seconds",
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_request_size == 0 {
            return Err(ConfigError::validation_failed(
                "Maximum request size must be greater than 0",
            ));
        }

        if self.public_dir.as_os_str().is_empty() {
            return Err(ConfigError::validation_failed(
                "Public directory cannot be empty",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("bind_addr".to_string(), source_of(ENV_BIND));
        sources.insert("public_dir".to_string(), source_of(ENV_PUBLIC_DIR));
        sources.insert("admin_token".to_string(), source_of(ENV_ADMIN_TOKEN));
        sources.insert(
            "max_request_size".to_string(),
            source_of(ENV_MAX_REQUEST_SIZE),
        );
        sources.insert(
            "shutdown_timeout_secs".to_string(),
            source_of(ENV_SHUTDOWN_TIMEOUT),
        );
        sources
    }
}
