//! Relay configuration
//!
//! Limits that bound the relay's memory: messages kept per room, number of
//! rooms, and the depth of each connection's outbound queue.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value loaded from environment variable
    EnvVar(String),
    /// Default value used
    Default(String),
}

/// Configuration trait shared by the relay and server configs
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Default configuration values
pub struct RelayDefaults;

impl RelayDefaults {
    pub const MAX_MESSAGES: usize = 1000;
    pub const MAX_ROOMS: usize = 5000;
    pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;
}

pub const ENV_MAX_MESSAGES: &str = "ROOMCAST_MAX_MESSAGES";
pub const ENV_MAX_ROOMS: &str = "ROOMCAST_MAX_ROOMS";
pub const ENV_OUTBOUND_QUEUE: &str = "ROOMCAST_OUTBOUND_QUEUE";

/// Relay limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// History length per room; oldest messages are evicted beyond it
    pub max_messages: usize,
    /// Number of rooms with history; publishing to a new room fails beyond it
    pub max_rooms: usize,
    /// Frames buffered per connection before fan-out starts dropping
    pub outbound_queue_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_messages: RelayDefaults::MAX_MESSAGES,
            max_rooms: RelayDefaults::MAX_ROOMS,
            outbound_queue_capacity: RelayDefaults::OUTBOUND_QUEUE_CAPACITY,
        }
    }
}

impl RelayConfig {
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_max_rooms(mut self, max_rooms: usize) -> Self {
        self.max_rooms = max_rooms;
        self
    }

    pub fn with_outbound_queue_capacity(mut self, capacity: usize) -> Self {
        self.outbound_queue_capacity = capacity;
        self
    }
}

impl AppConfigTrait for RelayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_messages: parse_env(
                ENV_MAX_MESSAGES,
                RelayDefaults::MAX_MESSAGES,
                "max_messages",
                "positive number of messages",
            )?,
            max_rooms: parse_env(
                ENV_MAX_ROOMS,
                RelayDefaults::MAX_ROOMS,
                "max_rooms",
                "positive number of rooms",
            )?,
            outbound_queue_capacity: parse_env(
                ENV_OUTBOUND_QUEUE,
                RelayDefaults::OUTBOUND_QUEUE_CAPACITY,
                "outbound_queue_capacity",
                "positive number of frames",
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_messages == 0 {
            return Err(ConfigError::validation_failed(
                "Maximum messages per room must be greater than 0",
            ));
        }

        if self.max_rooms == 0 {
            return Err(ConfigError::validation_failed(
                "Maximum rooms must be greater than 0",
            ));
        }

        if self.outbound_queue_capacity == 0 {
            return Err(ConfigError::validation_failed(
                "Outbound queue capacity must be greater than 0",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("max_messages".to_string(), source_of(ENV_MAX_MESSAGES));
        sources.insert("max_rooms".to_string(), source_of(ENV_MAX_ROOMS));
        sources.insert(
            "outbound_queue_capacity".to_string(),
            source_of(ENV_OUTBOUND_QUEUE),
        );
        sources
    }
}

/// Read `key` and parse it, falling back to `default` when unset
pub fn parse_env<T>(key: &str, default: T, field: &str, expected: &str) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::invalid_value(field, raw, expected)),
        Err(_) => Ok(default),
    }
}

/// Report whether `key` is set in the environment
pub fn source_of(key: &str) -> ConfigSource {
    if env::var_os(key).is_some() {
        ConfigSource::EnvVar(key.to_string())
    } else {
        ConfigSource::Default(key.to_string())
    }
}
