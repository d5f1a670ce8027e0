//! Shared configuration library for Scanward.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables (including a `.env` file picked up through
//! `dotenvy`). [`ConfigLoader`] produces the merged [`Config`] together with
//! non-fatal [`ConfigWarnings`].

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    BusConfig, Config, ConfigMetadata, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS, DEFAULT_REDIS_URL, DatabaseConfig,
    ScanConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use validation::{ConfigWarning, ConfigWarnings};
