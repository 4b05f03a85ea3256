//! Credential refresh workflows
//!
//! Each workflow is one full read-modify-write cycle of the credentials file.
//! Slow external calls happen before the file is locked and loaded, so the
//! lock is only held for the local update.

use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::exchange::{merge_into_store, AwsCliTransport, SessionExchanger, SessionToken, StsTransport};
use crate::profile::{ProfileFile, ProfileSet};
use crate::session::SessionGate;
use crate::settings::{required, SessionSettings, Settings, SsoSettings};
use crate::sso::{import_sso_block, CommandSsoFlow, SsoFlow};
use crate::vault::{OpCliTransport, SecretProvider, SessionEnv, VaultTransport};

/// Runs the credential workflows against one credentials file
pub struct CredentialRefresher {
    profiles: ProfileFile,
    secrets: SecretProvider,
    exchanger: SessionExchanger,
    sso_flow: Arc<dyn SsoFlow>,
    session: SessionSettings,
    sso: SsoSettings,
}

impl CredentialRefresher {
    /// Create a refresher with explicit transports
    pub fn new(
        settings: &Settings,
        vault: Arc<dyn VaultTransport>,
        sts: Arc<dyn StsTransport>,
        sso_flow: Arc<dyn SsoFlow>,
    ) -> Result<Self> {
        let gate = SessionGate::new(settings.last_login_path()?, settings.session_ttl()?);

        Ok(Self {
            profiles: ProfileFile::new(settings.credentials_path()?),
            secrets: SecretProvider::new(vault, gate),
            exchanger: SessionExchanger::new(sts),
            sso_flow,
            session: settings.session.clone(),
            sso: settings.sso.clone(),
        })
    }

    /// Create a refresher using the command-line transports named in `settings`
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let session_env = SessionEnv::load(&settings.session_env_path()?).await?;
        let vault = OpCliTransport::new(&settings.vault.command)?.with_session_env(session_env);
        let sts = AwsCliTransport::new(&settings.session.command)?;
        let sso_flow = CommandSsoFlow::new(settings.sso.command.clone());

        Self::new(settings, Arc::new(vault), Arc::new(sts), Arc::new(sso_flow))
    }

    /// The credentials file this refresher works on
    pub fn profiles(&self) -> &ProfileFile {
        &self.profiles
    }

    /// The vault session gate
    pub fn gate(&self) -> &SessionGate {
        self.secrets.gate()
    }

    /// Load the current profile set
    pub async fn load(&self) -> Result<ProfileSet> {
        self.profiles.load().await
    }

    /// Make `profile` the default profile
    pub async fn set_default(&self, profile: &str) -> Result<()> {
        self.profiles.update(|set| set.set_active(profile)).await?;
        info!("Default profile set to {}", profile);
        Ok(())
    }

    /// Exchange the long-lived key pair for a session token and store it
    pub async fn refresh_session(&self) -> Result<SessionToken> {
        let key_item = required(&self.session.key_item, "session.keyItem")?;
        let mfa_item = required(&self.session.mfa_item, "session.mfaItem")?;
        let profile_name = self.session.profile_name.as_str();

        let key_pair = self
            .secrets
            .fetch(key_item, &["username", "password"], false)
            .await?;
        let device = self
            .secrets
            .fetch(mfa_item, &["username", "arn"], true)
            .await?;

        let token = self
            .exchanger
            .exchange_sts(&key_pair, &device.arn, &device.otp)
            .await?;

        self.profiles
            .update(|set| {
                merge_into_store(set, profile_name, &token);
                Ok(())
            })
            .await?;

        info!("Session profile {} refreshed", profile_name);
        Ok(token)
    }

    /// Sign in to the SSO portal and store the credentials it hands out
    pub async fn refresh_sso(&self) -> Result<()> {
        let item = required(&self.sso.item, "sso.item")?;
        let profile_name = self.sso.profile_name.as_str();

        let login = self
            .secrets
            .fetch(item, &["username", "password"], true)
            .await?;
        let block = self.sso_flow.sign_in(&login).await?;

        self.profiles
            .update(|set| import_sso_block(set, profile_name, &block))
            .await?;

        info!("SSO profile {} refreshed", profile_name);
        Ok(())
    }
}
