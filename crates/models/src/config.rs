use crate::error::ConfigError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "configs/default.toml";

/// Unprefixed environment variables and the config keys they feed.
const ENV_KEYS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("BIND", "server.bind"),
    ("GUNICORN_WORKERS", "workers.workers"),
    ("GUNICORN_THREADS", "workers.threads"),
    ("GUNICORN_TIMEOUT", "workers.timeout_secs"),
    ("DB_URL", "database.url"),
    ("DB_POOL_RECYCLE", "database.pool_recycle_secs"),
    ("DB_MAX_CONNECTIONS", "database.max_connections"),
    ("FLASK_DEBUG", "logging.debug"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub workers: WorkersConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WorkersConfig {
    pub workers: usize,
    pub threads: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub pre_ping: bool,
    pub pool_recycle_secs: u64,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    #[serde(deserialize_with = "deserialize_flag")]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 10000,
            },
            workers: WorkersConfig {
                workers: 2,
                threads: 4,
                timeout_secs: 90,
            },
            database: DatabaseConfig {
                url: None,
                pre_ping: true,
                pool_recycle_secs: 1800, // 30 minutes
                max_connections: 10,
                acquire_timeout_secs: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
                debug: false,
            },
        }
    }
}

impl Config {
    /// Defaults, then the TOML file at `path` (skipped when missing), then the
    /// process environment.
    pub fn figment(path: Option<&Path>) -> Figment {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(environment())
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                field: "server.port",
                reason: "must be between 1 and 65535".to_string(),
            });
        }
        if self.workers.workers == 0 {
            return Err(ConfigError::Invalid {
                field: "workers.workers",
                reason: "at least one worker is required".to_string(),
            });
        }
        if self.workers.threads == 0 {
            return Err(ConfigError::Invalid {
                field: "workers.threads",
                reason: "at least one thread per worker is required".to_string(),
            });
        }
        if self.workers.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "workers.timeout_secs",
                reason: "must be at least one second".to_string(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "database.max_connections",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        match self.database.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ConfigError::MissingDatabaseUrl),
        }
    }

    /// Requests served concurrently across the whole process.
    pub fn max_in_flight(&self) -> usize {
        self.workers.workers.saturating_mul(self.workers.threads)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.workers.timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

fn environment() -> Env {
    Env::raw().filter_map(|key| {
        ENV_KEYS
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
    })
}

/// Accepts the usual spellings of an on/off switch: `1`, `true`, `yes`, `on`.
/// Anything else, `FLASK_DEBUG=development` included, is off.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(i) => Ok(i == 1),
        Flag::Str(s) => Ok(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )),
    }
}
