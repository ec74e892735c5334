use std::env;
use std::fmt;
use std::time::Duration;

use shared::services::game_session_service::DEFAULT_NOTIFY_TIMEOUT;
use shared::services::notifier::DEFAULT_CHANNEL_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    DynamoDb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Missing required environment variable {}", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value '{}' for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub users_table: String,
    pub matches_table: String,
    pub notify_timeout: Duration,
    pub channel_capacity: usize,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let storage_backend = match get("STORAGE_BACKEND", "memory").to_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "dynamodb" => StorageBackend::DynamoDb,
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let log_format = match get("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let notify_timeout_ms = match lookup("NOTIFY_TIMEOUT_MS") {
            Some(value) => value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "NOTIFY_TIMEOUT_MS",
                value,
            })?,
            None => DEFAULT_NOTIFY_TIMEOUT.as_millis() as u64,
        };

        let channel_capacity = match lookup("CHANNEL_CAPACITY") {
            Some(value) => match value.parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "CHANNEL_CAPACITY",
                        value,
                    })
                }
            },
            None => DEFAULT_CHANNEL_CAPACITY,
        };

        Ok(AppConfig {
            bind_address: get("BIND_ADDRESS", "0.0.0.0:3000"),
            jwt_secret,
            storage_backend,
            users_table: get("USERS_TABLE", "users"),
            matches_table: get("MATCHES_TABLE", "match_history"),
            notify_timeout: Duration::from_millis(notify_timeout_ms),
            channel_capacity,
            log_format,
        })
    }
}
