//! Login checks and persisted sessions
//!
//! Credentials are checked through [`Authenticator`]; the shipped
//! implementation compares against fixed values from the config. A
//! successful login is remembered in the document store under
//! `currentAdmin` or `currentCollector` until logout.

use kvstore::{KvResult, KvStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::Collector;
use crate::error::{DeskError, DeskResult};

/// Document key for the logged-in administrator
pub const ADMIN_SESSION_KEY: &str = "currentAdmin";

/// Document key for the logged-in collector
pub const COLLECTOR_SESSION_KEY: &str = "currentCollector";

/// The administrator identity stored on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub username: String,
    pub name: String,
}

/// Credential checks for both roles
pub trait Authenticator {
    fn login_admin(&self, username: &str, password: &str) -> DeskResult<AdminSession>;

    /// `collectors` is the current crew; the id must match one exactly
    fn login_collector(&self, collector_id: &str, password: &str, collectors: &[Collector]) -> DeskResult<Collector>;
}

/// Fixed credentials: one admin account and a password shared by all collectors
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    pub admin_username: String,
    pub admin_password: String,
    pub admin_name: String,
    pub collector_password: String,
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            admin_name: "Administrator".to_string(),
            collector_password: "password123".to_string(),
        }
    }
}

impl Authenticator for StaticCredentials {
    fn login_admin(&self, username: &str, password: &str) -> DeskResult<AdminSession> {
        debug!(username = %username.trim(), "login_admin: called");
        if username.trim() == self.admin_username && password.trim() == self.admin_password {
            Ok(AdminSession {
                username: self.admin_username.clone(),
                name: self.admin_name.clone(),
            })
        } else {
            warn!(username = %username.trim(), "Admin login rejected");
            Err(DeskError::Unauthorized("Invalid username or password".to_string()))
        }
    }

    fn login_collector(&self, collector_id: &str, password: &str, collectors: &[Collector]) -> DeskResult<Collector> {
        let collector_id = collector_id.trim();
        debug!(%collector_id, "login_collector: called");
        match collectors.iter().find(|c| c.id == collector_id) {
            Some(collector) if password.trim() == self.collector_password => Ok(collector.clone()),
            _ => {
                warn!(%collector_id, "Collector login rejected");
                Err(DeskError::Unauthorized("Invalid Collector ID or Password".to_string()))
            }
        }
    }
}

/// A logged-in identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Admin(AdminSession),
    Collector(Collector),
}

/// Which session slot to address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Admin,
    Collector,
}

impl SessionKind {
    fn key(self) -> &'static str {
        match self {
            Self::Admin => ADMIN_SESSION_KEY,
            Self::Collector => COLLECTOR_SESSION_KEY,
        }
    }
}

/// Session slots persisted next to the records
pub struct SessionStore {
    kv: KvStore,
}

impl SessionStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Remember a login; returns false if it could not be written
    pub fn begin(&self, session: &Session) -> bool {
        let saved = match session {
            Session::Admin(admin) => self.kv.save(ADMIN_SESSION_KEY, admin),
            Session::Collector(collector) => self.kv.save(COLLECTOR_SESSION_KEY, collector),
        };
        if saved {
            info!(?session, "Session started");
        }
        saved
    }

    pub fn current_admin(&self) -> Option<AdminSession> {
        self.kv.load(ADMIN_SESSION_KEY)
    }

    pub fn current_collector(&self) -> Option<Collector> {
        self.kv.load(COLLECTOR_SESSION_KEY)
    }

    /// Forget a login; returns whether one existed
    pub fn end(&self, kind: SessionKind) -> KvResult<bool> {
        debug!(?kind, "end: called");
        self.kv.remove(kind.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_collectors;

    #[test]
    fn test_admin_login_trims_input() {
        let auth = StaticCredentials::default();
        let admin = auth.login_admin(" admin ", "admin123 ").unwrap();
        assert_eq!(admin.name, "Administrator");

        let err = auth.login_admin("admin", "wrong").unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
    }

    #[test]
    fn test_collector_login() {
        let auth = StaticCredentials::default();
        let crew = default_collectors();

        let collector = auth.login_collector("C002", "password123", &crew).unwrap();
        assert_eq!(collector.name, "Sarah Johnson");

        let err = auth.login_collector("C009", "password123", &crew).unwrap_err();
        assert_eq!(err, DeskError::Unauthorized("Invalid Collector ID or Password".to_string()));
        assert!(auth.login_collector("C002", "admin123", &crew).is_err());
    }

    #[test]
    fn test_custom_credentials() {
        let auth = StaticCredentials {
            admin_password: "s3cret".to_string(),
            ..StaticCredentials::default()
        };
        assert!(auth.login_admin("admin", "admin123").is_err());
        assert!(auth.login_admin("admin", "s3cret").is_ok());
    }

    #[test]
    fn test_session_round_trip_and_logout() {
        let kv = KvStore::in_memory();
        let sessions = SessionStore::new(kv.clone());
        assert!(sessions.current_admin().is_none());

        let admin = StaticCredentials::default().login_admin("admin", "admin123").unwrap();
        assert!(sessions.begin(&Session::Admin(admin.clone())));
        assert!(kv.contains(ADMIN_SESSION_KEY));
        assert_eq!(sessions.current_admin(), Some(admin));
        assert!(sessions.current_collector().is_none());

        assert!(sessions.end(SessionKind::Admin).unwrap());
        assert!(sessions.current_admin().is_none());
        assert!(!sessions.end(SessionKind::Admin).unwrap());
    }

    #[test]
    fn test_collector_session() {
        let sessions = SessionStore::new(KvStore::in_memory());
        let collector = default_collectors().remove(0);
        sessions.begin(&Session::Collector(collector.clone()));
        assert_eq!(sessions.current_collector(), Some(collector));
    }
}
