//! Explicit session context
//!
//! Holds the signed-in identity and bearer token. It is created once at
//! startup, handed to whatever needs it, and cleared on logout or when the
//! backend answers 401.

use peak_partner_shared::{Actor, Role};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;
use uuid::Uuid;

/// The signed-in party
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub profile_id: Uuid,
    pub role: Role,
    pub email: Option<String>,
    token: SecretString,
}

impl AuthSession {
    pub fn new(profile_id: Uuid, role: Role, email: Option<String>, token: String) -> Self {
        Self {
            profile_id,
            role,
            email,
            token: SecretString::new(token),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.profile_id, self.role)
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

/// Shared handle to the current session; cheap to clone
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context already holding `session`.
    pub fn with_session(session: AuthSession) -> Self {
        let ctx = Self::new();
        ctx.init(session);
        ctx
    }

    pub fn init(&self, session: AuthSession) {
        info!(profile_id = %session.profile_id, role = %session.role, "Session initialised");
        *self.write() = Some(session);
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.read().clone()
    }

    pub fn actor(&self) -> Option<Actor> {
        self.read().as_ref().map(AuthSession::actor)
    }

    pub fn bearer(&self) -> Option<String> {
        self.read().as_ref().map(AuthSession::bearer)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Drop the cached identity and token.
    pub fn clear(&self) {
        if self.write().take().is_some() {
            info!("Session cleared");
        }
    }

    // A panic while holding the lock leaves plain data behind; keep using it.
    fn read(&self) -> RwLockReadGuard<'_, Option<AuthSession>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<AuthSession>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AuthSession {
        AuthSession::new(
            Uuid::new_v4(),
            Role::Trainer,
            Some("coach@example.com".to_string()),
            "token-123".to_string(),
        )
    }

    #[test]
    fn test_clones_share_state() {
        let ctx = SessionContext::new();
        let other = ctx.clone();
        assert!(!other.is_authenticated());

        ctx.init(session());
        assert_eq!(other.bearer().as_deref(), Some("Bearer token-123"));

        other.clear();
        assert!(!ctx.is_authenticated());
        assert!(ctx.actor().is_none());
    }

    #[test]
    fn test_token_is_not_debug_printed() {
        let printed = format!("{:?}", session());
        assert!(!printed.contains("token-123"));
    }
}
