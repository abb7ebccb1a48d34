//! Command line front end
//!
//! Parses arguments with clap and drives the infrastructure layer. The
//! report builders are separate from printing so they can be tested.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::{error, info, warn};
use zonewatch_domain::value_objects::ValidationWarning;
use zonewatch_infrastructure::build_service;
use zonewatch_infrastructure::config::loader::render_toml;
use zonewatch_infrastructure::config::{AppConfig, ConfigLoader, MergedConfig, bridge};
use zonewatch_infrastructure::logging::init_logging;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Command line interface for zonewatch
#[derive(Parser, Debug)]
#[command(name = "zonewatch")]
#[command(about = "Scheduled camera zone analysis with provider failover")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// What to do; `run` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the scheduler and publisher until interrupted
    Run {
        /// Do not reload the configuration file when it changes
        #[arg(long)]
        no_watch: bool,
    },
    /// Analyze one zone now and print the result as JSON
    Analyze {
        /// Zone name
        zone: String,
    },
    /// Validate configuration and print the effective settings
    CheckConfig,
    /// List configured providers and zones
    Status,
}

impl Cli {
    /// Loader honoring `--config`
    pub fn loader(&self) -> ConfigLoader {
        match &self.config {
            Some(path) => ConfigLoader::new().with_config_path(path),
            None => ConfigLoader::new(),
        }
    }
}

/// Run the parsed command
pub async fn execute(cli: Cli) -> CliResult<()> {
    let loader = cli.loader();
    match cli.command.unwrap_or(Command::Run { no_watch: false }) {
        Command::Run { no_watch } => run(&loader, !no_watch).await,
        Command::Analyze { zone } => analyze(&loader, &zone).await,
        Command::CheckConfig => check_config(&loader),
        Command::Status => status(&loader),
    }
}

async fn run(loader: &ConfigLoader, watch: bool) -> CliResult<()> {
    let config = loader.load()?;
    init_logging(&config.logging)?;
    info!(
        config = ?loader.resolved_path(),
        watch,
        "Starting zonewatch"
    );

    let service = build_service(config, loader, watch).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Received shutdown signal, initiating graceful shutdown");

    if !service.shutdown().await {
        warn!("Some analyses did not finish within the shutdown timeout");
    }
    Ok(())
}

async fn analyze(loader: &ConfigLoader, zone: &str) -> CliResult<()> {
    let mut config = loader.load()?;
    init_logging(&config.logging)?;
    config.scheduler.enabled = false;

    let service = build_service(config, loader, false).await?;
    let result = service.control().run_zone_analysis(zone).await;
    service.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}

fn check_config(loader: &ConfigLoader) -> CliResult<()> {
    let config = loader.load()?;
    let (rendered, warnings) = check_report(&config)?;

    match loader.resolved_path() {
        Some(path) if path.exists() => eprintln!("Configuration file: {}", path.display()),
        _ => eprintln!("No configuration file found, using defaults"),
    }
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    print!("{rendered}");
    Ok(())
}

fn status(loader: &ConfigLoader) -> CliResult<()> {
    let config = loader.load()?;
    let (merged, _) = bridge::from_raw(&config.options)?;
    println!("{}", serde_json::to_string_pretty(&status_report(&merged))?);
    Ok(())
}

/// Effective configuration as TOML plus the option data warnings
pub fn check_report(config: &AppConfig) -> CliResult<(String, Vec<ValidationWarning>)> {
    let (_, warnings) = bridge::from_raw(&config.options)?;
    Ok((render_toml(config)?, warnings))
}

/// Providers in candidate order and zones with their schedules.
///
/// Credentials are reported only as present or absent.
pub fn status_report(config: &MergedConfig) -> Value {
    let mut providers: Vec<_> = config.providers().iter().collect();
    providers.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));

    json!({
        "providers": providers
            .iter()
            .map(|p| json!({
                "id": p.id,
                "kind": p.kind.as_str(),
                "model": p.model,
                "priority": p.priority,
                "enabled": p.enabled,
                "timeout_ms": p.timeout_ms,
                "cost_per_request": p.cost_per_request,
                "credential": p.credential.is_some(),
            }))
            .collect::<Vec<_>>(),
        "zones": config
            .zones()
            .iter()
            .map(|z| json!({
                "name": z.name,
                "camera_entity": z.camera_entity,
                "todo_list_entity": z.todo_list_entity,
                "schedule": z.schedule,
                "ignore_rules": z.ignore_rules,
            }))
            .collect::<Vec<_>>(),
    })
}
