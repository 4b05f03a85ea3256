//! Session token exchange

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::transport::{ExchangeRequest, StsTransport};
use super::types::SessionToken;
use crate::error::{CredsError, Result};
use crate::profile::ProfileSet;
use crate::vault::Credential;

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExchangeResponse {
    credentials: Option<RawCredentials>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCredentials {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
    expiration: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CredsError::Exchange(format!("response is missing Credentials.{}", name)))
}

impl TryFrom<RawCredentials> for SessionToken {
    type Error = CredsError;

    fn try_from(raw: RawCredentials) -> Result<Self> {
        Ok(Self {
            access_key_id: required(raw.access_key_id, "AccessKeyId")?,
            secret_access_key: required(raw.secret_access_key, "SecretAccessKey")?,
            session_token: required(raw.session_token, "SessionToken")?,
            expiration: required(raw.expiration, "Expiration")?,
        })
    }
}

/// Parse a token-exchange response. Either all four credential members are
/// present or the response is rejected.
pub(crate) fn parse_response(body: &str) -> Result<SessionToken> {
    let response: ExchangeResponse = serde_json::from_str(body)
        .map_err(|e| CredsError::Exchange(format!("unexpected response: {}", e)))?;

    let raw = response
        .credentials
        .ok_or_else(|| CredsError::Exchange("response has no Credentials".to_string()))?;

    SessionToken::try_from(raw)
}

/// Turns a long-lived key pair and a one-time code into a session token
pub struct SessionExchanger {
    transport: Arc<dyn StsTransport>,
}

impl SessionExchanger {
    /// Create an exchanger over a transport
    pub fn new(transport: Arc<dyn StsTransport>) -> Self {
        Self { transport }
    }

    /// Exchange `credential` (username = access key id, password = secret
    /// key) plus the MFA device's current code for a session token.
    ///
    /// A rejected code is not retried; a fresh code has to be fetched.
    pub async fn exchange_sts(
        &self,
        credential: &Credential,
        mfa_arn: &str,
        otp: &str,
    ) -> Result<SessionToken> {
        if credential.username.is_empty() || credential.password.is_empty() {
            return Err(CredsError::Exchange(
                "long-lived key pair is incomplete".to_string(),
            ));
        }
        if mfa_arn.is_empty() || otp.is_empty() {
            return Err(CredsError::Exchange(
                "MFA device identifier and one-time code are required".to_string(),
            ));
        }

        let request = ExchangeRequest {
            access_key_id: &credential.username,
            secret_access_key: &credential.password,
            serial_number: mfa_arn,
            token_code: otp,
        };

        let body = self.transport.get_session_token(request).await?;
        let token = parse_response(&body)?;

        info!(
            "Obtained session token via {} (expires {})",
            self.transport.backend_name(),
            token.expiration
        );
        Ok(token)
    }
}

/// Store a session token as the named profile, replacing any previous profile
/// of that name
pub fn merge_into_store(set: &mut ProfileSet, profile_name: &str, token: &SessionToken) {
    set.insert(profile_name, token.to_attributes());
    info!("Stored session token as profile {}", profile_name);
}
