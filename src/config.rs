//! Runtime configuration read once from the environment.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors raised at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Store connection, API credentials and scheduling knobs
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub mongo_uri: String,
    pub authentication_api: String,
    pub authentication_key: String,
    pub reference_id: String,
    pub link_api: String,
    pub database_name: String,
    pub collection_name: String,
    pub sync_interval: Duration,
    pub http_timeout: Duration,
    /// 0 means the scheduler never gives up
    pub max_consecutive_failures: u32,
    pub ensure_unique_index: bool,
    pub run_once: bool,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(ConfigError::Missing(name)),
            }
        };

        Ok(Self {
            mongo_uri: required("MongoURI")?,
            authentication_api: required("AuthenticationAPI")?,
            authentication_key: required("AuthenticationKey")?,
            reference_id: required("ReferenceID")?,
            link_api: required("LinkAPI")?,
            database_name: required("DatabaseName")?,
            collection_name: required("CollectionName")?,
            sync_interval: Duration::from_secs(parse_or(
                &lookup,
                "SyncIntervalSecs",
                DEFAULT_SYNC_INTERVAL_SECS,
            )?),
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HttpTimeoutSecs",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            max_consecutive_failures: parse_or(&lookup, "MaxConsecutiveFailures", 0)?,
            ensure_unique_index: parse_or(&lookup, "EnsureUniqueIndex", false)?,
            run_once: parse_or(&lookup, "SyncRunOnce", false)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .to_lowercase()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
