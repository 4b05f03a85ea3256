//! creds - refresh cloud credential profiles from a secrets vault
//!
//! Every subcommand is a single read-modify-write of the credentials file.
//! Vault sign-in is not performed here: sign in with the vault's own client
//! first, then run `creds session` or `creds sso` within the session window.

use clap::Parser;
use std::process::ExitCode;
use tracing::Level;

use creds_cli::Cli;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = std::io::stdout();
    match creds_cli::run(cli, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
