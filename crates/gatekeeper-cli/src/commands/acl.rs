//! ACL inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatekeeper_auth::{Session, SessionState};
use gatekeeper_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for ACL commands
#[derive(Debug, Args)]
pub struct AclArgs {
    /// ACL subcommand
    #[command(subcommand)]
    pub command: AclCommand,
}

/// ACL subcommands
#[derive(Debug, Subcommand)]
pub enum AclCommand {
    /// List configured ACL keys and their rules
    List,
    /// Resolve a resource path for a hypothetical caller
    Check {
        /// Resource path, `bucket/key`
        resource: String,
        /// Caller login; omit to check an absent session
        #[arg(short, long)]
        login: Option<String>,
        /// Membership as `group` or `group/subgroup`; repeatable
        #[arg(short, long = "member")]
        members: Vec<String>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AclRow {
    key: String,
    rules: String,
}

#[derive(Debug, Serialize, Tabled)]
struct CheckRow {
    resource: String,
    caller: String,
    decision: String,
    matched_key: String,
    matched_rule: String,
}

/// Execute ACL commands
pub async fn execute(args: &AclArgs, location: &str, format: OutputFormat) -> Result<(), AppError> {
    let (config, snapshot) = super::load_snapshot(location).await?;

    match &args.command {
        AclCommand::List => {
            let rows: Vec<AclRow> = config
                .acls
                .iter()
                .map(|(key, rules)| AclRow {
                    key: key.clone(),
                    rules: rules.join(", "),
                })
                .collect();
            output::print_list(&rows, format);
        }
        AclCommand::Check {
            resource,
            login,
            members,
        } => {
            if login.is_none() && !members.is_empty() {
                return Err(AppError::validation("--member requires --login"));
            }
            let state = SessionState::from(
                login
                    .as_deref()
                    .map(|login| Session::from_specs(login, members))
                    .transpose()?,
            );

            let resolution = snapshot.acl().resolve(resource, &state);
            let row = CheckRow {
                resource: resource.clone(),
                caller: state.login().unwrap_or("(absent)").to_string(),
                decision: format!("{:?}", resolution.decision).to_lowercase(),
                matched_key: resolution.matched_key.unwrap_or_else(|| "-".to_string()),
                matched_rule: resolution
                    .matched_rule
                    .map(|rule| rule.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            };
            output::print_record(&row, format);

            if format == OutputFormat::Table
                && state.login().is_none()
                && row.decision == "allow"
            {
                output::print_warning(
                    "requests without a session are still sent to login before any ACL check",
                );
            }
        }
    }

    Ok(())
}
