//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use gatekeeper_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
    /// Validate configuration, including keys, auth URL, and ACL rules
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    location: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let source = super::open_source(location).await?;
            let raw = source.fetch().await?;
            let config = gatekeeper_core::config::AppConfig::from_raw(&raw)?;
            output::print_item(&config.redacted(), format);
        }
        ConfigCommand::Validate => {
            let (config, snapshot) = super::load_snapshot(location).await.map_err(invalid)?;
            output::print_success(&format!("Configuration '{}' is valid", location));
            output::print_kv("Listen", &config.server.bind_address());
            output::print_kv("Mode", &snapshot.mode().to_string());
            output::print_kv("Auth URL", snapshot.auth_url().as_str());
            output::print_kv("Cookie", snapshot.codec().cookie_name());
            output::print_kv("Domain", snapshot.codec().domain());
            output::print_kv(
                "Lifetime",
                &format!("{}s", snapshot.codec().lifetime_seconds()),
            );
            output::print_kv("ACL keys", &snapshot.acl().table().len().to_string());
            if !snapshot.acl().table().has_default() {
                output::print_warning("No 'default' ACL: unmatched paths are denied");
            }
        }
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to create dir: {}", e)))?;
            }

            tokio::fs::write(out_path, default_config)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write config: {}", e)))?;

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}

/// Prefixes a load failure so the single error line printed by `main`
/// reads as a validation verdict.
fn invalid(e: AppError) -> AppError {
    AppError {
        kind: e.kind,
        message: format!("Configuration invalid: {}", e.message),
        source: e.source,
    }
}
