use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub bus: FileBusConfig,
    #[serde(default)]
    pub scan: FileScanConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileBusConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileScanConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_host_lookups: Option<usize>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_password: Option<String>,
    pub database_name: Option<String>,
    pub database_max_connections: Option<u32>,
    pub database_min_connections: Option<u32>,
    pub redis_url: Option<String>,
    pub max_concurrent_host_lookups: Option<usize>,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    /// Read the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        EnvConfig {
            config_path: var("SCANWARD_CONFIG").map(PathBuf::from),
            database_url: var("DATABASE_URL"),
            database_host: var("DB_HOST"),
            database_port: var("DB_PORT").and_then(|s| s.trim().parse().ok()),
            database_user: var("DB_USER"),
            database_password: var("DB_PASSWORD"),
            database_name: var("CORE_DB_NAME"),
            database_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|s| s.trim().parse().ok()),
            database_min_connections: var("DB_MIN_CONNECTIONS")
                .and_then(|s| s.trim().parse().ok()),
            redis_url: var("REDIS_URL"),
            max_concurrent_host_lookups: var("SCAN_MAX_CONCURRENT_HOST_LOOKUPS")
                .and_then(|s| s.trim().parse().ok()),
            log_filter: var("SCANWARD_LOG"),
        }
    }
}
