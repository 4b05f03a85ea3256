//! Vault session gate
//!
//! Signing in to the vault happens outside this crate. The sign-in helper
//! records the time of the last successful login as epoch seconds in a small
//! file; a session is considered usable for a fixed time-to-live after that.
//! Every vault lookup checks the gate first and refuses to run on a stale
//! session.

use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{CredsError, Result};

/// Default session time-to-live in minutes
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

/// Whether a session that logged in at `last_login` is still usable at `now`.
///
/// Without a recorded login there is no session. A login whose expiry falls
/// outside the representable time range is never valid.
pub fn is_valid(last_login: Option<DateTime<Utc>>, now: DateTime<Utc>, ttl: Duration) -> bool {
    last_login
        .and_then(|login| login.checked_add_signed(ttl))
        .is_some_and(|expires_at| expires_at >= now)
}

/// State of the vault session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No login has been recorded
    NoSession,
    /// The session is usable until `expires_at`
    Valid { expires_at: DateTime<Utc> },
    /// The session lapsed
    Expired { last_login: DateTime<Utc> },
}

/// Reads the last-login record and decides whether the session is usable
#[derive(Debug, Clone)]
pub struct SessionGate {
    last_login_file: PathBuf,
    ttl: Duration,
}

impl SessionGate {
    /// Create a gate over the given last-login file
    pub fn new(last_login_file: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            last_login_file: last_login_file.into(),
            ttl,
        }
    }

    /// Path of the last-login record
    pub fn last_login_file(&self) -> &Path {
        &self.last_login_file
    }

    /// Session time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read the recorded login time. A missing or unreadable record is `None`.
    pub async fn last_login(&self) -> Result<Option<DateTime<Utc>>> {
        if !self.last_login_file.exists() {
            debug!("No last-login record at {:?}", self.last_login_file);
            return Ok(None);
        }

        let contents = tokio::fs::read_to_string(&self.last_login_file).await?;
        let login = contents
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        if login.is_none() {
            warn!(
                "Ignoring unreadable last-login record at {:?}",
                self.last_login_file
            );
        }

        Ok(login)
    }

    /// Session state at `now`
    pub async fn state_at(&self, now: DateTime<Utc>) -> Result<SessionState> {
        let Some(login) = self.last_login().await? else {
            return Ok(SessionState::NoSession);
        };

        let state = match login.checked_add_signed(self.ttl) {
            Some(expires_at) if expires_at >= now => SessionState::Valid { expires_at },
            Some(_) => SessionState::Expired { last_login: login },
            None => {
                warn!(
                    "Ignoring out-of-range last-login record at {:?}",
                    self.last_login_file
                );
                SessionState::NoSession
            }
        };

        Ok(state)
    }

    /// Current session state
    pub async fn status(&self) -> Result<SessionState> {
        self.state_at(Utc::now()).await
    }

    /// Fail unless the session is currently usable
    pub async fn check(&self) -> Result<()> {
        match self.status().await? {
            SessionState::Valid { expires_at } => {
                debug!("Vault session valid until {}", expires_at);
                Ok(())
            }
            SessionState::NoSession => Err(CredsError::NoSession),
            SessionState::Expired { last_login } => Err(CredsError::SessionExpired {
                last_login: last_login.to_rfc3339(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ttl() -> Duration {
        Duration::minutes(DEFAULT_SESSION_TTL_MINUTES)
    }

    #[test]
    fn test_session_boundary() {
        let now = Utc::now();

        assert!(is_valid(Some(now - Duration::seconds(29 * 60 + 59)), now, ttl()));
        assert!(is_valid(Some(now - ttl()), now, ttl()));
        assert!(!is_valid(Some(now - Duration::seconds(30 * 60 + 1)), now, ttl()));
        assert!(!is_valid(None, now, ttl()));
        assert!(!is_valid(Some(DateTime::<Utc>::MAX_UTC), now, ttl()));
    }

    #[tokio::test]
    async fn test_missing_record_is_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let gate = SessionGate::new(temp_dir.path().join(".op_last_login"), ttl());

        assert_eq!(gate.status().await.unwrap(), SessionState::NoSession);
        assert!(matches!(gate.check().await, Err(CredsError::NoSession)));
    }

    #[tokio::test]
    async fn test_recent_login_is_valid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".op_last_login");
        let login = Utc::now().timestamp() - 60;
        std::fs::write(&path, format!("{}\n", login)).unwrap();

        let gate = SessionGate::new(&path, ttl());
        gate.check().await.unwrap();
        assert!(matches!(gate.status().await.unwrap(), SessionState::Valid { .. }));
    }

    #[tokio::test]
    async fn test_stale_login_is_expired() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".op_last_login");
        let login = Utc::now().timestamp() - 31 * 60;
        std::fs::write(&path, login.to_string()).unwrap();

        let gate = SessionGate::new(&path, ttl());
        assert!(matches!(
            gate.check().await,
            Err(CredsError::SessionExpired { .. })
        ));
    }

    #[tokio::test]
    async fn test_state_at_reports_expiry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".op_last_login");
        std::fs::write(&path, "1700000000").unwrap();

        let gate = SessionGate::new(&path, ttl());
        let login = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert_eq!(
            gate.state_at(login + Duration::minutes(10)).await.unwrap(),
            SessionState::Valid {
                expires_at: login + ttl()
            }
        );
        assert_eq!(
            gate.state_at(login + Duration::minutes(31)).await.unwrap(),
            SessionState::Expired { last_login: login }
        );
    }

    #[tokio::test]
    async fn test_garbage_record_is_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".op_last_login");
        std::fs::write(&path, "yesterday").unwrap();

        let gate = SessionGate::new(&path, ttl());
        assert!(matches!(gate.check().await, Err(CredsError::NoSession)));
    }

    #[tokio::test]
    async fn test_out_of_range_record_is_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".op_last_login");
        // Parses as a timestamp, but adding the ttl overflows
        std::fs::write(&path, "8210266876799").unwrap();

        let gate = SessionGate::new(&path, ttl());
        assert_eq!(gate.status().await.unwrap(), SessionState::NoSession);
        assert!(matches!(gate.check().await, Err(CredsError::NoSession)));
    }
}
