//! Application settings management
//!
//! Settings live in a plain JSON file and are loaded once per invocation.
//! Every field has a default, so a missing file or a partial file is fine;
//! vault item names have no sensible default and are checked when the
//! workflow that needs them runs.

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CredsError, Result};
use crate::session::DEFAULT_SESSION_TTL_MINUTES;

/// Vault client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaultSettings {
    /// `op` command line (program followed by global arguments)
    pub command: Vec<String>,
    /// File recording the last successful vault login (epoch seconds)
    pub last_login_file: Option<PathBuf>,
    /// File holding the vault session variables
    pub session_env_file: Option<PathBuf>,
    /// Minutes a vault login stays usable
    pub session_ttl_minutes: i64,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            command: vec!["op".to_string()],
            last_login_file: None,
            session_env_file: None,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

/// Token exchange configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Profile receiving the session token
    pub profile_name: String,
    /// Vault item holding the long-lived key pair (username/password)
    pub key_item: Option<String>,
    /// Vault item holding the MFA device (arn + one-time code)
    pub mfa_item: Option<String>,
    /// `aws` command line (program followed by global arguments)
    pub command: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            profile_name: "session".to_string(),
            key_item: None,
            mfa_item: None,
            command: vec!["aws".to_string()],
        }
    }
}

/// SSO portal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsoSettings {
    /// Profile receiving the portal credentials
    pub profile_name: String,
    /// Vault item holding the portal login (username/password + one-time code)
    pub item: Option<String>,
    /// Helper command driving the portal
    pub command: Vec<String>,
}

impl Default for SsoSettings {
    fn default() -> Self {
        Self {
            profile_name: "sso".to_string(),
            item: None,
            command: Vec::new(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Credentials file (defaults to `~/.aws/credentials`)
    pub credentials_file: Option<PathBuf>,
    pub vault: VaultSettings,
    pub session: SessionSettings,
    pub sso: SsoSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            credentials_file: None,
            vault: VaultSettings::default(),
            session: SessionSettings::default(),
            sso: SsoSettings::default(),
        }
    }
}

fn home_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| CredsError::Config("Could not determine home directory".to_string()))
}

/// Value of a required setting, or a configuration error naming it
pub fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CredsError::Config(format!("{} is not configured", name)))
}

impl Settings {
    /// Effective credentials file path
    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.credentials_file {
            Some(path) => Ok(path.clone()),
            None => Ok(home_dir()?.join(".aws").join("credentials")),
        }
    }

    /// Effective last-login record path
    pub fn last_login_path(&self) -> Result<PathBuf> {
        match &self.vault.last_login_file {
            Some(path) => Ok(path.clone()),
            None => Ok(home_dir()?.join(".config").join("op").join(".op_last_login")),
        }
    }

    /// Effective vault session file path
    pub fn session_env_path(&self) -> Result<PathBuf> {
        match &self.vault.session_env_file {
            Some(path) => Ok(path.clone()),
            None => Ok(home_dir()?.join(".config").join("op").join(".op_session")),
        }
    }

    /// Vault session time-to-live. Must be a positive number of minutes.
    pub fn session_ttl(&self) -> Result<chrono::Duration> {
        let minutes = self.vault.session_ttl_minutes;
        chrono::Duration::try_minutes(minutes)
            .filter(|_| minutes > 0)
            .ok_or_else(|| {
                CredsError::Config(format!(
                    "vault.sessionTtlMinutes must be a positive number of minutes, got {}",
                    minutes
                ))
            })
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Default settings file location
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "creds")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| CredsError::Config("Could not determine config directory".to_string()))
    }

    /// Load settings from `settings_file`, falling back to defaults if it does not exist
    pub async fn load(settings_file: impl Into<PathBuf>) -> Result<Self> {
        let settings_file = settings_file.into();
        let settings = Self::load_from_file(&settings_file).await?;

        Ok(Self {
            settings_file,
            settings,
        })
    }

    async fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| CredsError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| CredsError::Config(e.to_string()))?;

        if let Some(parent) = self.settings_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Settings file path
    pub fn path(&self) -> &Path {
        &self.settings_file
    }

    /// Whether the settings file exists on disk
    pub fn exists(&self) -> bool {
        self.settings_file.exists()
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Take the loaded settings
    pub fn into_settings(self) -> Settings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::load(temp_dir.path().join("settings.json"))
            .await
            .unwrap();

        let settings = manager.get();
        assert_eq!(settings.vault.session_ttl_minutes, 30);
        assert_eq!(settings.vault.command, vec!["op".to_string()]);
        assert_eq!(settings.session.profile_name, "session");
        assert!(settings.sso.command.is_empty());
        assert!(!manager.exists());
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        // Create and modify settings
        {
            let mut manager = SettingsManager::load(&path).await.unwrap();
            manager.get_mut().session.key_item = Some("aws-iam-user".to_string());
            manager.get_mut().vault.session_ttl_minutes = 10;
            manager.save().await.unwrap();
        }

        // Load and verify
        {
            let manager = SettingsManager::load(&path).await.unwrap();
            assert_eq!(manager.get().session.key_item.as_deref(), Some("aws-iam-user"));
            assert_eq!(
                manager.get().session_ttl().unwrap(),
                chrono::Duration::minutes(10)
            );
        }
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"credentialsFile": "/tmp/creds", "sso": {"item": "portal", "command": ["sso-helper", "--headless"]}}"#,
        )
        .unwrap();

        let settings = SettingsManager::load(&path).await.unwrap().into_settings();
        assert_eq!(settings.credentials_path().unwrap(), PathBuf::from("/tmp/creds"));
        assert_eq!(settings.sso.item.as_deref(), Some("portal"));
        assert_eq!(settings.sso.profile_name, "sso");
        assert_eq!(settings.sso.command.len(), 2);
        assert_eq!(settings.vault.session_ttl_minutes, 30);
    }

    #[tokio::test]
    async fn test_session_ttl_out_of_range() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        for minutes in ["9223372036854775807", "0", "-5"] {
            std::fs::write(
                &path,
                format!(r#"{{"vault": {{"sessionTtlMinutes": {}}}}}"#, minutes),
            )
            .unwrap();

            let settings = SettingsManager::load(&path).await.unwrap().into_settings();
            assert!(
                matches!(settings.session_ttl(), Err(CredsError::Config(_))),
                "sessionTtlMinutes = {minutes}"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            SettingsManager::load(&path).await,
            Err(CredsError::Config(_))
        ));
    }

    #[test]
    fn test_required_setting() {
        assert_eq!(required(&Some("item".to_string()), "x").unwrap(), "item");
        assert!(matches!(required(&None, "session.keyItem"), Err(CredsError::Config(m)) if m.contains("session.keyItem")));
        assert!(required(&Some(String::new()), "x").is_err());
    }
}
