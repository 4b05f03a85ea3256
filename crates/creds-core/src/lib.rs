//! # creds-core
//!
//! Credential store engine for cloud CLI profiles:
//! - Parse/serialize of the sectioned credentials file
//! - Vault lookups gated on a time-boxed vault session
//! - Session-token exchange from a long-lived key pair plus a one-time code
//! - Import of credential blocks handed out by an SSO portal

pub mod error;
pub mod exchange;
pub mod profile;
pub mod refresh;
pub mod session;
pub mod settings;
pub mod sso;
pub mod vault;
mod process;

pub use error::{CredsError, Result};
pub use exchange::{merge_into_store, AwsCliTransport, SessionExchanger, SessionToken, StsTransport};
pub use profile::{ProfileAttributes, ProfileFile, ProfileSet};
pub use refresh::CredentialRefresher;
pub use session::{SessionGate, SessionState};
pub use settings::{Settings, SettingsManager};
pub use sso::{import_sso_block, CommandSsoFlow, SsoFlow};
pub use vault::{Credential, CredentialField, OpCliTransport, SecretProvider, VaultTransport};
