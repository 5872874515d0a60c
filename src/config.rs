//! Environment-driven configuration.
//!
//! Every credential comes from the environment (or a `.env` file loaded at
//! startup). Missing required values abort startup before anything is bound
//! or connected.

use std::env;

use thiserror::Error;

/// Default HTTP port when `PORT` is unset.
const DEFAULT_PORT: u16 = 5001;
/// Default Redis port when `REDIS_PORT` is unset.
const DEFAULT_REDIS_PORT: u16 = 16326;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub storage: StorageSettings,
    pub cache: CacheSettings,
}

/// Object-storage (R2) credentials and bucket.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
}

impl StorageSettings {
    /// The S3-compatible endpoint is derived from the account id.
    pub fn endpoint(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.account_id)
    }
}

/// Redis connection parameters.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl CacheSettings {
    /// Build a typed connection descriptor instead of splicing credentials
    /// into a URL (passwords may contain URL-significant characters).
    pub fn connection_info(&self) -> redis::ConnectionInfo {
        redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: redis::RedisConnectionInfo {
                username: Some(self.username.clone()),
                password: Some(self.password.clone()),
                ..Default::default()
            },
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let port_or = |name: &'static str, default: u16| -> Result<u16, ConfigError> {
            match lookup(name) {
                Some(value) if !value.is_empty() => value
                    .parse()
                    .map_err(|_| ConfigError::Invalid { name, value }),
                _ => Ok(default),
            }
        };

        Ok(Settings {
            port: port_or("PORT", DEFAULT_PORT)?,
            storage: StorageSettings {
                account_id: required("R2_ACCOUNT_ID")?,
                access_key_id: required("R2_ACCESS_KEY_ID")?,
                secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
                bucket_name: required("R2_BUCKET_NAME")?,
            },
            cache: CacheSettings {
                host: required("REDIS_HOST")?,
                port: port_or("REDIS_PORT", DEFAULT_REDIS_PORT)?,
                username: lookup("REDIS_USERNAME")
                    .filter(|value| !value.is_empty())
                    .unwrap_or_else(|| "default".to_string()),
                password: required("REDIS_PASSWORD")?,
            },
        })
    }
}
