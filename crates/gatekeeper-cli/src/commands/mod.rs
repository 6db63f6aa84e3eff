//! CLI command definitions and dispatch.

pub mod acl;
pub mod config;
pub mod keygen;
pub mod session;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use gatekeeper_core::config::{AppConfig, ConfigLocation, DEFAULT_CONFIG_LOCATION};
use gatekeeper_core::error::AppError;
use gatekeeper_core::traits::ConfigSource;
use gatekeeper_service::GatewaySnapshot;

use crate::output::OutputFormat;

/// Gatekeeper: session-checked, ACL-gated access to object storage
#[derive(Debug, Parser)]
#[command(name = "gatekeeper", version, about, long_about = None)]
pub struct Cli {
    /// Configuration location: a file path or s3://bucket/key
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate fresh signing and encryption keys
    Keygen,
    /// Configuration management
    Config(config::ConfigArgs),
    /// Session token tools
    Session(session::SessionArgs),
    /// ACL inspection
    Acl(acl::AclArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let location = self.location();
        match &self.command {
            Commands::Keygen => keygen::execute(self.format),
            Commands::Config(args) => config::execute(args, &location, self.format).await,
            Commands::Session(args) => session::execute(args, &location, self.format).await,
            Commands::Acl(args) => acl::execute(args, &location, self.format).await,
        }
    }

    /// `--config`, else `GATEKEEPER_CONFIG`, else the default path.
    fn location(&self) -> String {
        self.config.clone().unwrap_or_else(|| {
            std::env::var(gatekeeper_core::config::CONFIG_LOCATION_ENV)
                .unwrap_or_else(|_| DEFAULT_CONFIG_LOCATION.to_string())
        })
    }
}

/// Helper: open the configuration source at `location`
pub async fn open_source(location: &str) -> Result<Arc<dyn ConfigSource>, AppError> {
    let location = ConfigLocation::parse(location)?;
    gatekeeper_storage::open_config_source(&location).await
}

/// Helper: load and validate configuration
pub async fn load_config(location: &str) -> Result<AppConfig, AppError> {
    let source = open_source(location).await?;
    AppConfig::load(source.as_ref()).await
}

/// Helper: load configuration and build the gateway snapshot from it
pub async fn load_snapshot(location: &str) -> Result<(AppConfig, GatewaySnapshot), AppError> {
    let config = load_config(location).await?;
    let snapshot = GatewaySnapshot::from_config(&config)?;
    Ok((config, snapshot))
}
