//! Command-line arguments

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// creds - keep cloud CLI credential profiles fresh from your vault
#[derive(Parser, Debug)]
#[command(name = "creds")]
#[command(version)]
#[command(about = "Refresh cloud credential profiles from a secrets vault, STS and SSO")]
pub struct Cli {
    /// Credentials file to operate on
    #[arg(long, global = true, env = "AWS_SHARED_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "CREDS_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the profiles in the credentials file
    List,
    /// Copy a profile into the default profile
    SetDefault {
        /// Profile to make the default
        profile: String,
    },
    /// Refresh the MFA session profile through a token exchange
    Session,
    /// Refresh the SSO profile through the portal helper
    Sso,
    /// Show whether the vault session is still usable
    Status,
    /// Show the effective settings
    Config {
        /// Write a settings file with the effective settings if none exists
        #[arg(long)]
        init: bool,
    },
}
