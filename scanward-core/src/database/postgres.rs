use std::{fmt, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::database::infrastructure::postgres::repositories::{
    PostgresHostsRepository, PostgresScanStore, PostgresToolsRepository,
};
use crate::database::ports::{
    hosts::HostsRepository, scans::ScanStore, tools::ToolsRepository,
};
use crate::error::{CoreError, Result};

/// Pool sizing for [`PostgresDatabase::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
        }
    }
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    settings: PoolSettings,
    hosts: PostgresHostsRepository,
    tools: PostgresToolsRepository,
    scans: PostgresScanStore,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pool_size = self.pool.size();
        let idle = self.pool.num_idle();

        f.debug_struct("PostgresDatabase")
            .field("pool_size", &pool_size)
            .field("idle_connections", &idle)
            .field("max_connections", &self.settings.max_connections)
            .field("min_connections", &self.settings.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(
        connection_string: &str,
        settings: PoolSettings,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .max_lifetime(Duration::from_secs(1800))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(connection_string)
            .await
            .map_err(|e| {
                CoreError::Database(format!("Database connection failed: {e}"))
            })?;

        info!(
            "Database pool initialized with max_connections={}, min_connections={}",
            settings.max_connections, settings.min_connections
        );

        Ok(Self::from_pool_with_settings(pool, settings))
    }

    /// Wrap an existing pool, e.g. the one `#[sqlx::test]` hands out.
    pub fn from_pool(pool: PgPool) -> Self {
        Self::from_pool_with_settings(pool, PoolSettings::default())
    }

    fn from_pool_with_settings(pool: PgPool, settings: PoolSettings) -> Self {
        PostgresDatabase {
            hosts: PostgresHostsRepository::new(pool.clone()),
            tools: PostgresToolsRepository::new(pool.clone()),
            scans: PostgresScanStore::new(pool.clone()),
            pool,
            settings,
        }
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            CoreError::Database(format!("Failed to run migrations: {e}"))
        })?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn hosts_repository(&self) -> Arc<dyn HostsRepository> {
        Arc::new(self.hosts.clone())
    }

    pub fn tools_repository(&self) -> Arc<dyn ToolsRepository> {
        Arc::new(self.tools.clone())
    }

    pub fn scan_store(&self) -> Arc<dyn ScanStore> {
        Arc::new(self.scans.clone())
    }
}
