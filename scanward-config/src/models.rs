use std::path::PathBuf;

/// Filter used when neither `SCANWARD_LOG` nor `log_filter` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";
/// Bus endpoint used when nothing else is configured.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";
/// Default bound on concurrent host lookups per scan request.
pub const DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS: usize = 16;

/// Fully merged runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection settings.
    pub database: DatabaseConfig,
    /// Message bus settings.
    pub bus: BusConfig,
    /// Scan orchestration tuning.
    pub scan: ScanConfig,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
    /// Where the values came from.
    pub metadata: ConfigMetadata,
}

/// Postgres connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection URL; `None` when neither a URL nor discrete connection
    /// parts were configured.
    pub url: Option<String>,
    /// Upper bound of the connection pool.
    pub max_connections: u32,
    /// Idle connections kept open.
    pub min_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

/// Message bus settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Redis endpoint used for pub/sub.
    pub redis_url: String,
}

/// Scan orchestration tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// How many host lookups a single scan request may run at once.
    pub max_concurrent_host_lookups: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrent_host_lookups: DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS,
        }
    }
}

/// Provenance of a loaded [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    /// TOML file that contributed values, if any.
    pub config_path: Option<PathBuf>,
    /// Whether a `.env` file was read.
    pub env_file_loaded: bool,
}
