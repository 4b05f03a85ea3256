//! Token exchange transports

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{CredsError, Result};
use crate::process;

/// Inputs of a single token exchange
#[derive(Clone, Copy)]
pub struct ExchangeRequest<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    /// MFA device identifier
    pub serial_number: &'a str,
    /// Current one-time code of the MFA device
    pub token_code: &'a str,
}

impl std::fmt::Debug for ExchangeRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRequest")
            .field("access_key_id", &self.access_key_id)
            .field("serial_number", &self.serial_number)
            .finish_non_exhaustive()
    }
}

/// Raw access to the temporary-token endpoint.
///
/// Implementations return the endpoint's JSON response verbatim and fail with
/// [`CredsError::Exchange`] when the endpoint rejects the request.
#[async_trait]
pub trait StsTransport: Send + Sync {
    async fn get_session_token(&self, request: ExchangeRequest<'_>) -> Result<String>;

    /// Human-readable name of this transport
    fn backend_name(&self) -> &'static str;
}

/// Token exchange through the AWS command-line client
pub struct AwsCliTransport {
    program: String,
    base_args: Vec<String>,
}

impl AwsCliTransport {
    /// Create a transport from the `aws` command line, e.g. `["aws", "--region", "eu-west-1"]`
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, base_args) = command
            .split_first()
            .ok_or_else(|| CredsError::Config("session.command is empty".to_string()))?;

        Ok(Self {
            program: program.clone(),
            base_args: base_args.to_vec(),
        })
    }
}

#[async_trait]
impl StsTransport for AwsCliTransport {
    async fn get_session_token(&self, request: ExchangeRequest<'_>) -> Result<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .args([
                "sts",
                "get-session-token",
                "--serial-number",
                request.serial_number,
                "--token-code",
                request.token_code,
                "--output",
                "json",
            ])
            // The long-lived pair must win over any ambient profile or session
            .env_remove("AWS_PROFILE")
            .env_remove("AWS_SESSION_TOKEN")
            .env("AWS_ACCESS_KEY_ID", request.access_key_id)
            .env("AWS_SECRET_ACCESS_KEY", request.secret_access_key);

        let captured = process::run(&mut command)
            .await
            .map_err(|e| CredsError::Exchange(format!("failed to run {}: {}", self.program, e)))?;

        if !captured.success {
            return Err(CredsError::Exchange(format!(
                "get-session-token {}",
                captured.failure()
            )));
        }

        Ok(captured.stdout)
    }

    fn backend_name(&self) -> &'static str {
        "AWS CLI"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn request() -> ExchangeRequest<'static> {
        ExchangeRequest {
            access_key_id: "AKIDLONG",
            secret_access_key: "secret",
            serial_number: "arn:aws:iam::123456789012:mfa/bob",
            token_code: "123456",
        }
    }

    #[tokio::test]
    async fn test_aws_cli_arguments_and_environment() {
        let transport = AwsCliTransport::new(&[
            "sh".to_string(),
            "-c".to_string(),
            "echo \"$AWS_ACCESS_KEY_ID:$AWS_SECRET_ACCESS_KEY:${AWS_SESSION_TOKEN:-none} $*\"".to_string(),
            "aws".to_string(),
        ])
        .unwrap();

        let output = transport.get_session_token(request()).await.unwrap();
        assert_eq!(
            output.trim(),
            "AKIDLONG:secret:none sts get-session-token --serial-number arn:aws:iam::123456789012:mfa/bob --token-code 123456 --output json"
        );
    }

    #[tokio::test]
    async fn test_rejected_code_is_exchange_error() {
        let transport = AwsCliTransport::new(&[
            "sh".to_string(),
            "-c".to_string(),
            "echo 'An error occurred (AccessDenied): MultiFactorAuthentication failed with invalid MFA one time pass code.' >&2; exit 254".to_string(),
        ])
        .unwrap();

        match transport.get_session_token(request()).await.unwrap_err() {
            CredsError::Exchange(message) => {
                assert!(message.contains("status 254"));
                assert!(message.contains("AccessDenied"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", request());
        assert!(debug.contains("AKIDLONG"));
        assert!(!debug.contains("secret\""));
        assert!(!debug.contains("123456\""));
    }
}
