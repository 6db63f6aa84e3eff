//! Session token tools: mint tokens for testing, inspect presented ones.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatekeeper_auth::{Memberships, Session, SessionState};
use gatekeeper_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Encode a session with the configured keys
    Mint {
        /// Login of the session holder
        #[arg(short, long)]
        login: String,
        /// Membership as `group` or `group/subgroup`; repeatable
        #[arg(short, long = "member")]
        members: Vec<String>,
    },
    /// Decode a token with the configured keys
    Inspect {
        /// Token as found in the session cookie
        token: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct MintedToken {
    cookie: String,
    token: String,
    set_cookie: String,
}

#[derive(Debug, Serialize, Tabled)]
struct InspectedSession {
    state: String,
    login: String,
    memberships: String,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    location: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (_, snapshot) = super::load_snapshot(location).await?;
    let codec = snapshot.codec();

    match &args.command {
        SessionCommand::Mint { login, members } => {
            let session = Session::from_specs(login.as_str(), members)?;
            let token = codec.encode(&session)?;
            let minted = MintedToken {
                cookie: codec.cookie_name().to_string(),
                set_cookie: codec.cookie(&token),
                token,
            };
            output::print_record(&minted, format);
        }
        SessionCommand::Inspect { token } => match codec.decode(token) {
            SessionState::Active(session) => {
                let inspected = InspectedSession {
                    state: "active".to_string(),
                    login: session.login().to_string(),
                    memberships: format_memberships(session.memberships()),
                };
                output::print_record(&inspected, format);
            }
            SessionState::Absent => match format {
                OutputFormat::Table => output::print_warning(
                    "absent: token expired, tampered, or minted with other keys or domain",
                ),
                OutputFormat::Json => output::print_record(
                    &InspectedSession {
                        state: "absent".to_string(),
                        login: String::new(),
                        memberships: String::new(),
                    },
                    format,
                ),
            },
        },
    }

    Ok(())
}

/// `group/subgroup` list, bare `group` for memberships without sub-groups.
fn format_memberships(memberships: &Memberships) -> String {
    let mut specs = Vec::new();
    for (group, subgroups) in memberships {
        if subgroups.is_empty() {
            specs.push(group.clone());
        } else {
            specs.extend(subgroups.iter().map(|sub| format!("{group}/{sub}")));
        }
    }
    specs.join(", ")
}
