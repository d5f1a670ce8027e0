use std::sync::Arc;

use anyhow::{Context, bail};
use scanward_config::Config;
use scanward_core::bus::RedisEventBus;
use scanward_core::database::{PoolSettings, PostgresDatabase};
use scanward_core::scan::ScanService;
use scanward_core::tools::ToolRegistry;
use scanward_model::{Credential, NewHost, OperatorId, TenantId};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

#[derive(Debug)]
pub struct NewHostArgs {
    pub tenant: Uuid,
    pub operator: Uuid,
    pub alias: String,
    pub domain: Option<String>,
    pub ip: Option<String>,
    pub credentials: Vec<String>,
}

async fn connect_database(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let Some(url) = config.database.url.as_deref() else {
        bail!("no database configured; set DATABASE_URL or [database] in scanward.toml");
    };
    let settings = PoolSettings {
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
    };
    PostgresDatabase::connect(url, settings)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn scan_service(config: &Config) -> anyhow::Result<ScanService> {
    let db = connect_database(config).await?;
    let bus = RedisEventBus::connect(&config.bus.redis_url)
        .await
        .context("failed to connect to Redis")?;

    Ok(
        ScanService::new(db.hosts_repository(), db.scan_store(), Arc::new(bus))
            .with_max_concurrent_host_lookups(
                config.scan.max_concurrent_host_lookups,
            ),
    )
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn migrate(config: &Config) -> anyhow::Result<()> {
    let db = connect_database(config).await?;
    db.migrate().await.context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

pub async fn seed_tools(config: &Config) -> anyhow::Result<()> {
    let db = connect_database(config).await?;
    let tools = ToolRegistry::new(db.tools_repository())
        .ensure_defaults()
        .await
        .context("failed to seed scanner tools")?;
    info!(count = tools.len(), "scanner tools registered");
    print_json(&tools)
}

pub async fn list_tools(config: &Config) -> anyhow::Result<()> {
    let db = connect_database(config).await?;
    let tools = ToolRegistry::new(db.tools_repository())
        .list()
        .await
        .context("failed to list scanner tools")?;
    print_json(&tools)
}

pub async fn add_host(config: &Config, args: NewHostArgs) -> anyhow::Result<()> {
    let new_host = new_host_from_args(args)?;

    let db = connect_database(config).await?;
    let host = db
        .hosts_repository()
        .create_host(&new_host)
        .await
        .context("failed to register host")?;

    info!(host_id = %host.id, alias = %host.alias, "host registered");
    // Credentials stay out of the output.
    print_json(&json!({
        "id": host.id,
        "alias": host.alias,
        "domain_name": host.domain_name,
        "ip_address": host.ip_address,
    }))
}

pub async fn create_scan(
    config: &Config,
    tenant: Uuid,
    operator: Uuid,
    host_ids: &[String],
) -> anyhow::Result<()> {
    let service = scan_service(config).await?;
    let scan = service
        .create_scan(TenantId(tenant), OperatorId(operator), host_ids)
        .await?;
    print_json(&scan)
}

pub async fn cancel_scan(config: &Config, scan_id: &str) -> anyhow::Result<()> {
    let service = scan_service(config).await?;
    let scan_id = service.cancel_scan(scan_id).await?;
    print_json(&json!({ "scanID": scan_id, "cancelled": true }))
}

pub async fn scan_summaries(config: &Config, tenant: Uuid) -> anyhow::Result<()> {
    let service = scan_service(config).await?;
    let summaries = service.get_scan_summaries(TenantId(tenant)).await?;
    print_json(&summaries)
}

fn new_host_from_args(args: NewHostArgs) -> anyhow::Result<NewHost> {
    let credentials = args
        .credentials
        .iter()
        .map(|raw| parse_credential(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let host = NewHost {
        tenant_id: TenantId(args.tenant),
        operator_id: OperatorId(args.operator),
        domain_name: args.domain.unwrap_or_default(),
        ip_address: args.ip.unwrap_or_default(),
        alias: args.alias,
        credentials,
        rapporteurs: Vec::new(),
    }
    .normalized();

    if !host.has_address() {
        bail!("a host needs --domain, --ip or both");
    }
    if host.alias.is_empty() {
        bail!("--alias must not be blank");
    }
    Ok(host)
}

fn parse_credential(raw: &str) -> anyhow::Result<Credential> {
    match raw.split_once(':') {
        Some((username, password)) if !username.is_empty() => Ok(Credential {
            username: username.to_string(),
            password: password.to_string(),
        }),
        _ => bail!("credential must look like user:password"),
    }
}
