//! Error types for creds-core

use thiserror::Error;

/// Result type alias for credential store operations
pub type Result<T> = std::result::Result<T, CredsError>;

/// Credential store error types
#[derive(Error, Debug)]
pub enum CredsError {
    #[error("Malformed credentials file at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("Vault lookup failed: {0}")]
    Vault(String),

    #[error("No vault session - please sign in to the vault first")]
    NoSession,

    #[error("Vault session expired (last login {last_login}) - please sign in to the vault again")]
    SessionExpired { last_login: String },

    #[error("Token exchange failed: {0}")]
    Exchange(String),

    #[error("Profile '{name}' not found. Available profiles: {}", .available.join(", "))]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("SSO flow failed: {0}")]
    Sso(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CredsError {
    /// Whether this error means the vault session has to be re-established
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::NoSession | Self::SessionExpired { .. })
    }
}
