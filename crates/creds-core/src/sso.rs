//! Single sign-on portal adapter
//!
//! Driving the portal is delegated to an external helper. The helper signs in
//! with the credentials it is given and prints the portal's credential block,
//! which is in the same dialect as the credentials file:
//!
//! ```text
//! [123456789012_AdministratorAccess]
//! aws_access_key_id=ASIA...
//! aws_secret_access_key=...
//! aws_session_token=...
//! ```

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{CredsError, Result};
use crate::process;
use crate::profile::{parse_attributes, ProfileSet};
use crate::vault::Credential;

/// Copy-button caption the portal renders inside the credential block
const COPY_CAPTION: &str = "Click to copy this text";

/// Environment variable carrying the SSO username to the helper
pub const SSO_USERNAME_ENV: &str = "CREDS_SSO_USERNAME";
/// Environment variable carrying the SSO password to the helper
pub const SSO_PASSWORD_ENV: &str = "CREDS_SSO_PASSWORD";
/// Environment variable carrying the one-time code to the helper
pub const SSO_OTP_ENV: &str = "CREDS_SSO_OTP";

/// Obtains a temporary credential block from an SSO portal
#[async_trait]
pub trait SsoFlow: Send + Sync {
    /// Sign in with `credential` and return the portal's credential block
    async fn sign_in(&self, credential: &Credential) -> Result<String>;
}

/// SSO flow delegated to an external helper command
pub struct CommandSsoFlow {
    command: Vec<String>,
}

impl CommandSsoFlow {
    /// Create a flow running `command` (program followed by its arguments)
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SsoFlow for CommandSsoFlow {
    async fn sign_in(&self, credential: &Credential) -> Result<String> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| CredsError::Config("sso.command is not configured".to_string()))?;

        let mut command = Command::new(program);
        command
            .args(args)
            .env(SSO_USERNAME_ENV, &credential.username)
            .env(SSO_PASSWORD_ENV, &credential.password)
            .env(SSO_OTP_ENV, &credential.otp);

        let captured = process::run(&mut command)
            .await
            .map_err(|e| CredsError::Sso(format!("failed to run {}: {}", program, e)))?;

        if !captured.success {
            return Err(CredsError::Sso(format!("{} {}", program, captured.failure())));
        }

        debug!("SSO helper returned {} bytes", captured.stdout.len());
        Ok(captured.stdout)
    }
}

/// Strip the copy caption and the leading bracketed label from a portal block
pub fn strip_block_label(block: &str) -> Result<String> {
    let cleaned = block.replace(COPY_CAPTION, "");
    let trimmed = cleaned.trim_start();

    if !trimmed.starts_with('[') {
        return Ok(trimmed.to_string());
    }

    let (_, rest) = trimmed.split_once(']').ok_or_else(|| CredsError::Format {
        line: 1,
        message: "credential block label lacks a closing bracket".to_string(),
    })?;

    Ok(rest.to_string())
}

/// Store the credentials of a portal block as `profile_name`, replacing any
/// previous profile of that name
pub fn import_sso_block(set: &mut ProfileSet, profile_name: &str, block: &str) -> Result<()> {
    let body = strip_block_label(block)?;
    let attributes = parse_attributes(&body);

    if attributes.is_empty() {
        return Err(CredsError::Sso(
            "portal returned no credential attributes".to_string(),
        ));
    }

    set.insert(profile_name, attributes);
    info!("Stored SSO credentials as profile {}", profile_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "[123456789012_AdministratorAccess]\naws_access_key_id=ASIAEXAMPLE\naws_secret_access_key=secret\naws_session_token=IQoJb3JpZ2lu==\n";

    fn sso_credential() -> Credential {
        Credential {
            username: "alice".to_string(),
            password: "pw".to_string(),
            otp: "123456".to_string(),
            arn: String::new(),
        }
    }

    #[test]
    fn test_import_replaces_label_with_profile_name() {
        let mut set = ProfileSet::new();
        set.entry("lexer").insert("stale".to_string(), "x".to_string());

        import_sso_block(&mut set, "lexer", BLOCK).unwrap();

        let attrs = set.get("lexer").unwrap();
        assert_eq!(
            attrs.keys().collect::<Vec<_>>(),
            vec!["aws_access_key_id", "aws_secret_access_key", "aws_session_token"]
        );
        assert_eq!(attrs["aws_session_token"], "IQoJb3JpZ2lu==");
        assert!(!set.contains("123456789012_AdministratorAccess"));
    }

    #[test]
    fn test_strip_caption() {
        let block = format!("{}\n{}", COPY_CAPTION, BLOCK);
        let body = strip_block_label(&block).unwrap();
        assert!(body.starts_with("\naws_access_key_id=ASIAEXAMPLE"));
    }

    #[test]
    fn test_block_without_label() {
        let mut set = ProfileSet::new();
        import_sso_block(&mut set, "sso", "aws_access_key_id = AK\n").unwrap();
        assert_eq!(set.get("sso").unwrap()["aws_access_key_id"], "AK");
    }

    #[test]
    fn test_unclosed_label_is_format_error() {
        let mut set = ProfileSet::new();
        assert!(matches!(
            import_sso_block(&mut set, "sso", "[broken\nk=v\n"),
            Err(CredsError::Format { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_empty_block_is_rejected() {
        let mut set = ProfileSet::new();
        assert!(matches!(
            import_sso_block(&mut set, "sso", "[label]\n"),
            Err(CredsError::Sso(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_command() {
        let flow = CommandSsoFlow::new(Vec::new());
        assert!(matches!(
            flow.sign_in(&sso_credential()).await,
            Err(CredsError::Config(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_helper_receives_credentials() {
        let flow = CommandSsoFlow::new(vec![
            "sh".to_string(),
            "-c".to_string(),
            "printf '[label]\\nuser=%s\\npass=%s\\notp=%s\\n' \"$CREDS_SSO_USERNAME\" \"$CREDS_SSO_PASSWORD\" \"$CREDS_SSO_OTP\"".to_string(),
        ]);

        let block = flow.sign_in(&sso_credential()).await.unwrap();
        assert_eq!(block, "[label]\nuser=alice\npass=pw\notp=123456\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_helper_failure_is_sso_error() {
        let flow = CommandSsoFlow::new(vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo 'portal timed out' >&2; exit 2".to_string(),
        ]);

        match flow.sign_in(&sso_credential()).await.unwrap_err() {
            CredsError::Sso(message) => assert!(message.contains("portal timed out")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
