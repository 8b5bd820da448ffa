//! Session management
//!
//! One session per logged-in representative or unlocked admin. The session
//! context is an explicit object handed to each operation; there is no
//! ambient "current user" state. Sessions live in memory, expire after an
//! idle TTL, and end at logout. No release operation exists for claims, so
//! nothing else hangs off a session.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use lead_portal_config::AuthConfig;

use crate::ServerError;

/// What a session is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May claim leads.
    Rep,
    /// May upload CSVs and reload configuration.
    Admin,
}

/// An authenticated session.
pub struct Session {
    pub token: String,
    pub name: String,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
    last_activity: RwLock<Instant>,
}

impl Session {
    fn new(name: &str, role: Role) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            name: name.to_string(),
            role,
            created_at: chrono::Utc::now(),
            last_activity: RwLock::new(Instant::now()),
        }
    }

    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_activity.read().elapsed()
    }
}

/// In-memory session table keyed by token.
pub struct SessionManager {
    sessions: DashMap<String, Arc<Session>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Start a representative session after checking the roster.
    pub fn login_rep(
        &self,
        auth: &AuthConfig,
        name: &str,
        password: &str,
    ) -> Result<Arc<Session>, ServerError> {
        if !auth.rep_password_matches(name, password) {
            tracing::warn!(rep = %name, "Rejected rep login");
            return Err(ServerError::Auth("Invalid name or password".to_string()));
        }

        let session = Arc::new(Session::new(name, Role::Rep));
        self.sessions.insert(session.token.clone(), session.clone());
        tracing::info!(rep = %name, "Rep session started");
        Ok(session)
    }

    /// Start an admin session after checking the unlock password.
    pub fn unlock_admin(
        &self,
        auth: &AuthConfig,
        password: &str,
    ) -> Result<Arc<Session>, ServerError> {
        if !auth.admin_password_matches(password) {
            tracing::warn!("Rejected admin unlock");
            return Err(ServerError::Auth("Wrong admin password".to_string()));
        }

        let session = Arc::new(Session::new("admin", Role::Admin));
        self.sessions.insert(session.token.clone(), session.clone());
        tracing::info!("Admin session started");
        Ok(session)
    }

    /// Look up a live session by token, evicting it if expired.
    pub fn get(&self, token: &str) -> Option<Arc<Session>> {
        let session = self.sessions.get(token)?.clone();
        if session.idle_for() > self.ttl {
            drop(self.sessions.remove(token));
            tracing::debug!(name = %session.name, "Session expired");
            return None;
        }
        session.touch();
        Some(session)
    }

    /// Look up a session and require a role.
    pub fn require(&self, token: &str, role: Role) -> Result<Arc<Session>, ServerError> {
        let session = self
            .get(token)
            .ok_or_else(|| ServerError::Session("No active session".to_string()))?;
        if session.role != role {
            return Err(ServerError::Session(format!(
                "This operation needs a {:?} session",
                role
            )));
        }
        Ok(session)
    }

    pub fn remove(&self, token: &str) {
        self.sessions.remove(token);
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> AuthConfig {
        let mut auth = AuthConfig::default();
        auth.reps.insert("Rahul".to_string(), "rahul123".to_string());
        auth.admin_password = "admin123".to_string();
        auth
    }

    #[test]
    fn test_rep_login() {
        let manager = SessionManager::new(Duration::from_secs(60));
        let auth = roster();

        assert!(manager.login_rep(&auth, "Rahul", "wrong").is_err());
        let session = manager.login_rep(&auth, "Rahul", "rahul123").unwrap();
        assert_eq!(session.role, Role::Rep);
        assert_eq!(session.name, "Rahul");
        assert!(manager.get(&session.token).is_some());
    }

    #[test]
    fn test_admin_unlock() {
        let manager = SessionManager::new(Duration::from_secs(60));
        let auth = roster();

        assert!(manager.unlock_admin(&auth, "nope").is_err());
        let session = manager.unlock_admin(&auth, "admin123").unwrap();
        assert_eq!(session.role, Role::Admin);
    }

    #[test]
    fn test_role_enforcement() {
        let manager = SessionManager::new(Duration::from_secs(60));
        let auth = roster();
        let rep = manager.login_rep(&auth, "Rahul", "rahul123").unwrap();

        assert!(manager.require(&rep.token, Role::Rep).is_ok());
        assert!(manager.require(&rep.token, Role::Admin).is_err());
        assert!(manager.require("no-such-token", Role::Rep).is_err());
    }

    #[test]
    fn test_expired_session_evicted() {
        let manager = SessionManager::new(Duration::from_millis(0));
        let auth = roster();
        let session = manager.login_rep(&auth, "Rahul", "rahul123").unwrap();

        std::thread::sleep(Duration::from_millis(5));
        assert!(manager.get(&session.token).is_none());
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn test_logout() {
        let manager = SessionManager::new(Duration::from_secs(60));
        let auth = roster();
        let session = manager.login_rep(&auth, "Rahul", "rahul123").unwrap();
        manager.remove(&session.token);
        assert!(manager.get(&session.token).is_none());
    }
}
