//! Credential type definitions

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Field of a vault item that maps onto a [`Credential`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    Username,
    Password,
    Otp,
    Arn,
}

/// Vault field ids recognised when building a credential
const FIELD_TABLE: &[(&str, CredentialField)] = &[
    ("username", CredentialField::Username),
    ("password", CredentialField::Password),
    ("otp", CredentialField::Otp),
    ("arn", CredentialField::Arn),
];

impl CredentialField {
    /// Look up a field by its vault id
    pub fn from_id(id: &str) -> Option<Self> {
        FIELD_TABLE
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, field)| *field)
    }

    /// Vault id of the field
    pub fn id(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::Otp => "otp",
            Self::Arn => "arn",
        }
    }
}

/// Fields extracted from a vault item - zeroed when dropped.
///
/// Fields the vault did not return stay empty.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub otp: String,
    pub arn: String,
}

impl Credential {
    /// Assign a value to a field
    pub fn set(&mut self, field: CredentialField, value: impl Into<String>) {
        let slot = match field {
            CredentialField::Username => &mut self.username,
            CredentialField::Password => &mut self.password,
            CredentialField::Otp => &mut self.otp,
            CredentialField::Arn => &mut self.arn,
        };
        slot.zeroize();
        *slot = value.into();
    }

    /// Read a field
    pub fn get(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::Username => &self.username,
            CredentialField::Password => &self.password,
            CredentialField::Otp => &self.otp,
            CredentialField::Arn => &self.arn,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("otp", &"[REDACTED]")
            .field("arn", &self.arn)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        assert_eq!(CredentialField::from_id("arn"), Some(CredentialField::Arn));
        assert_eq!(CredentialField::from_id("notesPlain"), None);
        assert_eq!(CredentialField::from_id("Username"), None);

        for (id, field) in FIELD_TABLE {
            assert_eq!(field.id(), *id);
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut cred = Credential::default();
        cred.set(CredentialField::Password, "hunter2");
        cred.set(CredentialField::Password, "correct horse");

        assert_eq!(cred.get(CredentialField::Password), "correct horse");
        assert_eq!(cred.get(CredentialField::Username), "");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = Credential {
            username: "bob".to_string(),
            password: "pw".to_string(),
            otp: "123456".to_string(),
            arn: String::new(),
        };
        let debug = format!("{:?}", cred);
        assert!(debug.contains("bob"));
        assert!(!debug.contains("pw\""));
        assert!(!debug.contains("123456"));
    }
}
