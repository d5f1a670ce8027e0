//! `scanwardctl`: operator entry point for the scan orchestration core.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use scanward_config::{Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions};
use scanward_core::scan::{Fault, ScanError};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod commands;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "scanwardctl")]
#[command(about = "Create, cancel and report on vulnerability scans")]
struct Cli {
    /// Path to scanward.toml (defaults to ./scanward.toml or config/scanward.toml)
    #[arg(long, global = true, env = "SCANWARD_CONFIG")]
    config: Option<PathBuf>,

    /// `.env` file to read instead of the one found from the working directory
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Database maintenance
    #[command(subcommand)]
    Db(DbCommand),
    /// Scanner tool catalogue
    #[command(subcommand)]
    Tools(ToolsCommand),
    /// Scan targets
    #[command(subcommand)]
    Hosts(HostsCommand),
    /// Scan lifecycle
    #[command(subcommand)]
    Scan(ScanCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum ToolsCommand {
    /// Register the built-in scanner tools (idempotent)
    Seed,
    /// Print the registered tools as JSON
    List,
}

#[derive(Debug, Subcommand)]
enum HostsCommand {
    /// Register a host that scans can target
    Add(AddHostArgs),
}

#[derive(Debug, Subcommand)]
enum ScanCommand {
    /// Create a pending scan over one or more hosts and announce it
    Create(CreateScanArgs),
    /// Announce that a scan should stop
    Cancel {
        /// Scan identifier (UUID)
        scan_id: String,
    },
    /// Print per-host scan summaries for a tenant as JSON
    Summaries(TenantArgs),
}

#[derive(ClapArgs, Debug, Clone)]
struct TenantArgs {
    /// Tenant the request acts for
    #[arg(long, env = "SCANWARD_TENANT_ID")]
    tenant: Uuid,
}

#[derive(ClapArgs, Debug, Clone)]
struct CreateScanArgs {
    #[command(flatten)]
    tenant: TenantArgs,

    /// Operator starting the scan
    #[arg(long, env = "SCANWARD_OPERATOR_ID")]
    operator: Uuid,

    /// Host identifiers to scan
    #[arg(required = true, num_args = 1..)]
    host_ids: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
struct AddHostArgs {
    #[command(flatten)]
    tenant: TenantArgs,

    /// Operator registering the host
    #[arg(long, env = "SCANWARD_OPERATOR_ID")]
    operator: Uuid,

    /// Unique display name
    #[arg(long)]
    alias: String,

    /// Domain name; preferred over --ip when scanning
    #[arg(long)]
    domain: Option<String>,

    /// IP address
    #[arg(long)]
    ip: Option<String>,

    /// Login for authenticated checks, as user:password (repeatable)
    #[arg(long = "credential", value_name = "USER:PASSWORD")]
    credentials: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code_for(&err)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_runtime_config(ConfigLoaderOptions {
        config_path: cli.config,
        env_file: cli.env_file,
    })?;

    match cli.command {
        Command::Db(DbCommand::Migrate) => commands::migrate(&config).await,
        Command::Tools(ToolsCommand::Seed) => commands::seed_tools(&config).await,
        Command::Tools(ToolsCommand::List) => commands::list_tools(&config).await,
        Command::Hosts(HostsCommand::Add(args)) => {
            commands::add_host(&config, commands::NewHostArgs {
                tenant: args.tenant.tenant,
                operator: args.operator,
                alias: args.alias,
                domain: args.domain,
                ip: args.ip,
                credentials: args.credentials,
            })
            .await
        }
        Command::Scan(ScanCommand::Create(args)) => {
            commands::create_scan(
                &config,
                args.tenant.tenant,
                args.operator,
                &args.host_ids,
            )
            .await
        }
        Command::Scan(ScanCommand::Cancel { scan_id }) => {
            commands::cancel_scan(&config, &scan_id).await
        }
        Command::Scan(ScanCommand::Summaries(args)) => {
            commands::scan_summaries(&config, args.tenant).await
        }
    }
}

fn load_runtime_config(options: ConfigLoaderOptions) -> anyhow::Result<Config> {
    let ConfigLoad { config, warnings } = ConfigLoader::with_options(options)
        .load()
        .context("failed to load configuration")?;

    // Logs go to stderr so command output on stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    warnings.log();

    Ok(config)
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ScanError>().map(ScanError::fault) {
        Some(Fault::Client) => ExitCode::from(2),
        Some(Fault::NotFound) => ExitCode::from(3),
        Some(Fault::Server) | None => ExitCode::FAILURE,
    }
}
