//! Subcommand dispatch

use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Write;
use tracing::debug;

use creds_core::profile::DEFAULT_PROFILE;
use creds_core::{CredentialRefresher, SessionState, SettingsManager};

use crate::cli::{Cli, Command};

/// Run one subcommand, writing its report to `out`
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let settings_path = match cli.settings {
        Some(path) => path,
        None => SettingsManager::default_path()?,
    };
    let mut manager = SettingsManager::load(&settings_path).await?;
    if let Some(path) = cli.credentials_file {
        manager.get_mut().credentials_file = Some(path);
    }

    let settings = match cli.command {
        Command::Config { init } => return config(&manager, init, out).await,
        _ => manager.into_settings(),
    };
    let refresher = CredentialRefresher::from_settings(&settings).await?;
    debug!("Using credentials file {:?}", refresher.profiles().path());

    match cli.command {
        Command::List => list(&refresher, out).await,
        Command::SetDefault { profile } => {
            refresher.set_default(&profile).await?;
            writeln!(out, "Default profile is now {}", profile)?;
            Ok(())
        }
        Command::Session => {
            let token = refresher
                .refresh_session()
                .await
                .context("Could not refresh the session profile")?;
            writeln!(
                out,
                "Session profile {} saved (expires {})",
                settings.session.profile_name, token.expiration
            )?;
            Ok(())
        }
        Command::Sso => {
            refresher
                .refresh_sso()
                .await
                .context("Could not refresh the SSO profile")?;
            writeln!(out, "SSO profile {} saved", settings.sso.profile_name)?;
            Ok(())
        }
        Command::Status => status(&refresher, out).await,
        Command::Config { .. } => Ok(()),
    }
}

async fn list(refresher: &CredentialRefresher, out: &mut dyn Write) -> Result<()> {
    let set = refresher.load().await?;
    let default = set.get(DEFAULT_PROFILE);

    for name in set.selectable() {
        let is_default = default.is_some() && set.get(&name) == default;
        if is_default {
            writeln!(out, "{} (default)", name)?;
        } else {
            writeln!(out, "{}", name)?;
        }
    }

    Ok(())
}

async fn status(refresher: &CredentialRefresher, out: &mut dyn Write) -> Result<()> {
    match refresher.gate().status().await? {
        SessionState::NoSession => {
            writeln!(out, "No vault session. Please sign in to the vault.")?;
        }
        SessionState::Valid { expires_at } => {
            let remaining = (expires_at - Utc::now()).num_minutes();
            writeln!(out, "Vault session is valid for {} more minutes.", remaining)?;
        }
        SessionState::Expired { last_login } => {
            writeln!(
                out,
                "Vault session expired (last login {}). Please sign in to the vault.",
                last_login.to_rfc3339()
            )?;
        }
    }

    Ok(())
}

async fn config(manager: &SettingsManager, init: bool, out: &mut dyn Write) -> Result<()> {
    if init {
        if manager.exists() {
            writeln!(out, "Settings file {} already exists", manager.path().display())?;
        } else {
            manager.save().await?;
            writeln!(out, "Wrote settings file {}", manager.path().display())?;
        }
        return Ok(());
    }

    writeln!(out, "# {}", manager.path().display())?;
    writeln!(out, "{}", serde_json::to_string_pretty(manager.get())?)?;
    Ok(())
}
