use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use url::Url;

use crate::models::{
    BusConfig, Config, ConfigMetadata, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS, DEFAULT_REDIS_URL, DatabaseConfig,
    ScanConfig,
};
use crate::sources::{EnvConfig, FileConfig, FileDatabaseConfig};
use crate::validation::ConfigWarnings;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["scanward.toml", "config/scanward.toml"];

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Knobs for [`ConfigLoader`].
#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    /// Explicit TOML path; must exist when set.
    pub config_path: Option<PathBuf>,
    /// `.env` file to read instead of the one `dotenvy` discovers.
    pub env_file: Option<PathBuf>,
}

/// Layers defaults, an optional TOML file and the environment.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

/// Result of a successful load.
#[derive(Debug)]
pub struct ConfigLoad {
    /// Merged configuration.
    pub config: Config,
    /// Non-fatal findings worth surfacing to the operator.
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    /// Loader with default discovery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with explicit options.
    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    /// Use `path` as the configuration file.
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Load `.env`, then merge the process environment over the file.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Merge `env` over the configuration file without touching the process
    /// environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            self.compose_config(file_config, env, config_path, env_file_loaded)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = if let Some(explicit) = &self.options.config_path
        {
            (explicit.clone(), true)
        } else if let Some(from_env) = &env.config_path {
            (from_env.clone(), true)
        } else {
            match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(found) => (found, false),
                None => return Ok((None, None)),
            }
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No scanward.toml detected; using environment variables and defaults",
                "Pass --config or set SCANWARD_CONFIG to point at a configuration file",
            );
        }

        let FileConfig {
            database: file_database,
            bus: file_bus,
            scan: file_scan,
            log_filter: file_log_filter,
        } = file_config.unwrap_or_default();

        let database = DatabaseConfig {
            url: resolve_database_url(&env, &file_database)?,
            max_connections: env
                .database_max_connections
                .or(file_database.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            min_connections: env
                .database_min_connections
                .or(file_database.min_connections)
                .unwrap_or(DEFAULT_MIN_CONNECTIONS),
        };

        if database.max_connections == 0 {
            return Err(ConfigLoadError::InvalidValue {
                field: "database.max_connections",
                reason: "must be at least 1".into(),
            });
        }
        if database.min_connections > database.max_connections {
            return Err(ConfigLoadError::InvalidValue {
                field: "database.min_connections",
                reason: format!(
                    "{} exceeds max_connections ({})",
                    database.min_connections, database.max_connections
                ),
            });
        }
        if database.url.is_none() {
            warnings.push_with_hint(
                "No database connection configured",
                "Set DATABASE_URL, or DB_HOST/DB_USER/CORE_DB_NAME, or [database] in scanward.toml",
            );
        }

        let redis_url = env
            .redis_url
            .or(file_bus.redis_url)
            .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());
        Url::parse(&redis_url)
            .map_err(|source| ConfigLoadError::InvalidRedisUrl { source })?;

        let max_concurrent_host_lookups = env
            .max_concurrent_host_lookups
            .or(file_scan.max_concurrent_host_lookups)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS);
        if max_concurrent_host_lookups == 0 {
            return Err(ConfigLoadError::InvalidValue {
                field: "scan.max_concurrent_host_lookups",
                reason: "must be at least 1".into(),
            });
        }

        let log_filter = env
            .log_filter
            .or(file_log_filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let config = Config {
            database,
            bus: BusConfig { redis_url },
            scan: ScanConfig {
                max_concurrent_host_lookups,
            },
            log_filter,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        Ok((config, warnings))
    }
}

fn resolve_database_url(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<String>, ConfigLoadError> {
    if let Some(url) = env.database_url.clone() {
        return Ok(Some(url));
    }

    let password = env
        .database_password
        .clone()
        .or_else(|| file_database.password.clone())
        .filter(|value| !value.is_empty());

    if let Some(stored_url) = file_database.url.as_deref() {
        let trimmed = stored_url.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let mut parsed = Url::parse(trimmed)
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
        if parsed.password().is_none() {
            if let Some(password) = &password {
                parsed
                    .set_password(Some(password))
                    .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
            }
        }
        return Ok(Some(parsed.to_string()));
    }

    let host = env
        .database_host
        .clone()
        .or_else(|| file_database.host.clone());
    let user = env
        .database_user
        .clone()
        .or_else(|| file_database.user.clone());
    let name = env
        .database_name
        .clone()
        .or_else(|| file_database.name.clone());

    if let (Some(host), Some(user), Some(name)) = (host, user, name) {
        let port = env.database_port.or(file_database.port).unwrap_or(5432);
        let mut url = Url::parse(&format!("postgresql://{host}:{port}/{name}"))
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
        url.set_username(&user).map_err(|_| {
            ConfigLoadError::InvalidDatabaseUsername {
                username: user.clone(),
            }
        })?;
        if let Some(password) = &password {
            url.set_password(Some(password))
                .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
        }
        return Ok(Some(url.to_string()));
    }

    Ok(None)
}

/// Why configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("invalid database username '{username}'")]
    InvalidDatabaseUsername { username: String },
    #[error("failed to encode database password into URL")]
    InvalidDatabasePassword,
    #[error("invalid Redis URL")]
    InvalidRedisUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

impl ConfigLoadError {
    /// File the error refers to, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigLoadError::MissingConfig { path }
            | ConfigLoadError::Io { path, .. }
            | ConfigLoadError::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}
