//! Vault transports

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{CredsError, Result};
use crate::process;

/// Raw access to the vault's item lookups.
///
/// Implementations return the vault's JSON output verbatim; interpreting it
/// is left to [`SecretProvider`](super::SecretProvider).
#[async_trait]
pub trait VaultTransport: Send + Sync {
    /// Look up the named fields of an item.
    ///
    /// Returns a JSON array of `{"id": ..., "value": ...}` objects.
    async fn item_fields(&self, item: &str, fields: &[&str]) -> Result<String>;

    /// Look up the item's current one-time code.
    ///
    /// Returns a JSON object with a `totp` member.
    async fn item_totp(&self, item: &str) -> Result<String>;

    /// Human-readable name of this transport
    fn backend_name(&self) -> &'static str;
}

/// Environment variables carrying an established vault session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionEnv {
    vars: Vec<(String, String)>,
}

impl SessionEnv {
    /// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped,
    /// an `export ` prefix and surrounding quotes are tolerated.
    pub fn parse(text: &str) -> Self {
        let vars = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let line = line.strip_prefix("export ").unwrap_or(line);
                let (key, value) = line.split_once('=')?;
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);
                Some((key.trim().to_string(), value.to_string()))
            })
            .collect();

        Self { vars }
    }

    /// Load session variables from a file. A missing file yields no variables.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No vault session file at {:?}", path);
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let env = Self::parse(&contents);
        debug!("Loaded {} vault session variables", env.vars.len());
        Ok(env)
    }

    /// Variables in file order
    pub fn vars(&self) -> &[(String, String)] {
        &self.vars
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Vault transport backed by the 1Password command-line client
pub struct OpCliTransport {
    program: String,
    base_args: Vec<String>,
    session_env: SessionEnv,
}

impl OpCliTransport {
    /// Create a transport from the `op` command line, e.g. `["op", "--account", "my"]`
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, base_args) = command
            .split_first()
            .ok_or_else(|| CredsError::Config("vault.command is empty".to_string()))?;

        Ok(Self {
            program: program.clone(),
            base_args: base_args.to_vec(),
            session_env: SessionEnv::default(),
        })
    }

    /// Pass session variables to every `op` invocation
    pub fn with_session_env(mut self, session_env: SessionEnv) -> Self {
        self.session_env = session_env;
        self
    }

    fn item_get(&self, item: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.base_args).args(["item", "get", item]);
        command.envs(self.session_env.vars().iter().map(|(k, v)| (k, v)));
        command
    }

    async fn run(&self, mut command: Command, item: &str) -> Result<String> {
        let captured = process::run(&mut command)
            .await
            .map_err(|e| CredsError::Vault(format!("failed to run {}: {}", self.program, e)))?;

        if !captured.success {
            return Err(CredsError::Vault(format!(
                "lookup of item {} {}",
                item,
                captured.failure()
            )));
        }

        Ok(captured.stdout)
    }
}

#[async_trait]
impl VaultTransport for OpCliTransport {
    async fn item_fields(&self, item: &str, fields: &[&str]) -> Result<String> {
        let joined = fields.join(",");
        let mut command = self.item_get(item);
        command.args(["--fields", joined.as_str(), "--format", "json"]);
        self.run(command, item).await
    }

    async fn item_totp(&self, item: &str) -> Result<String> {
        let mut command = self.item_get(item);
        command.args(["--field", "type=otp", "--format", "json"]);
        self.run(command, item).await
    }

    fn backend_name(&self) -> &'static str {
        "1Password CLI"
    }
}
