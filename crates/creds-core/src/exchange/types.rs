//! Session token type definitions

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::profile::ProfileAttributes;

/// Profile attribute holding the access key id
pub const ACCESS_KEY_ID: &str = "aws_access_key_id";
/// Profile attribute holding the secret access key
pub const SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
/// Profile attribute holding the session token
pub const SESSION_TOKEN: &str = "aws_session_token";
/// Profile attribute holding the session expiry
pub const SESSION_EXPIRATION: &str = "aws_session_expiration";

/// Temporary credentials issued by a token exchange - zeroed when dropped
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// Expiry as reported by the endpoint (ISO 8601)
    pub expiration: String,
}

impl SessionToken {
    /// Profile attributes for this token, in file order
    pub fn to_attributes(&self) -> ProfileAttributes {
        [
            (ACCESS_KEY_ID, &self.access_key_id),
            (SECRET_ACCESS_KEY, &self.secret_access_key),
            (SESSION_TOKEN, &self.session_token),
            (SESSION_EXPIRATION, &self.expiration),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}
