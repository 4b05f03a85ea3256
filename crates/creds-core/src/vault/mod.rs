//! Secret lookups against the external vault

mod provider;
mod transport;
mod types;

pub use provider::SecretProvider;
pub use transport::{OpCliTransport, SessionEnv, VaultTransport};
pub use types::{Credential, CredentialField};
