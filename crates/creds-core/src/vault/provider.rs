//! Credential retrieval gated on the vault session

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::transport::VaultTransport;
use super::types::{Credential, CredentialField};
use crate::error::{CredsError, Result};
use crate::session::SessionGate;

/// One field of a vault item as returned by a field lookup
#[derive(Deserialize)]
struct VaultField {
    id: String,
    #[serde(default)]
    value: String,
}

/// A single-field lookup returns a bare object rather than an array
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldsResponse {
    Many(Vec<VaultField>),
    One(VaultField),
}

#[derive(Deserialize)]
struct TotpResponse {
    totp: String,
}

/// Builds credentials from vault items
pub struct SecretProvider {
    transport: Arc<dyn VaultTransport>,
    gate: SessionGate,
}

impl SecretProvider {
    /// Create a provider over a transport, guarded by a session gate
    pub fn new(transport: Arc<dyn VaultTransport>, gate: SessionGate) -> Self {
        Self { transport, gate }
    }

    /// The session gate consulted before every lookup
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Fetch the named fields of `item`, plus its one-time code when `with_otp`.
    ///
    /// Returned fields that do not exist on [`Credential`] are dropped.
    /// Nothing is looked up unless the vault session is valid.
    pub async fn fetch(&self, item: &str, fields: &[&str], with_otp: bool) -> Result<Credential> {
        self.gate.check().await?;

        debug!(
            "Fetching fields [{}] of item {} via {}",
            fields.join(","),
            item,
            self.transport.backend_name()
        );

        let output = self.transport.item_fields(item, fields).await?;
        let entries = match serde_json::from_str::<FieldsResponse>(&output) {
            Ok(FieldsResponse::Many(entries)) => entries,
            Ok(FieldsResponse::One(entry)) => vec![entry],
            Err(e) => {
                return Err(CredsError::Vault(format!(
                    "unexpected field lookup output for item {}: {}",
                    item, e
                )))
            }
        };

        let mut credential = Credential::default();
        for entry in entries {
            match CredentialField::from_id(&entry.id) {
                Some(field) => credential.set(field, entry.value),
                None => debug!("Dropping unrecognised field {} of item {}", entry.id, item),
            }
        }

        if with_otp {
            let output = self.transport.item_totp(item).await?;
            let response: TotpResponse = serde_json::from_str(&output).map_err(|e| {
                CredsError::Vault(format!(
                    "unexpected one-time code output for item {}: {}",
                    item, e
                ))
            })?;
            credential.set(CredentialField::Otp, response.totp.trim());
        }

        info!("Fetched credentials for item {}", item);
        Ok(credential)
    }
}
