//! Session lifecycle and role resolution.
//!
//! One `SessionManager` is constructed at startup and owns the only
//! long-lived piece of client state: the current auth session and the watch
//! channel that fans out session changes. Subscribers hold a receiver;
//! dropping it releases the subscription. There is no ambient global here —
//! the manager is passed to whoever needs it.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::filter::Filter;
use crate::gateway::{AuthError, AuthSession, Gateway, GatewayError, SignUpOutcome};
use crate::records::{Role, Session};

/// Authentication state as observed by the rest of the app.
///
/// `Loading` is the transient startup state until `restore` completes.
/// `role: None` means the session is established but the role probes have
/// not finished yet.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Loading,
    Unauthenticated,
    Authenticated {
        session: Session,
        role: Option<Role>,
    },
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthState::Authenticated { role, .. } => *role,
            _ => None,
        }
    }
}

/// Session snapshot persisted between CLI invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub saved_at: DateTime<Utc>,
}

impl From<&AuthSession> for StoredSession {
    fn from(auth: &AuthSession) -> Self {
        Self {
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
            user_id: auth.user_id,
            email: auth.email.clone(),
            expires_at: auth.expires_at,
            saved_at: Utc::now(),
        }
    }
}

impl StoredSession {
    fn into_auth_session(self) -> AuthSession {
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user_id: self.user_id,
            email: self.email,
            expires_at: self.expires_at,
        }
    }
}

pub struct SessionManager {
    gateway: Arc<Gateway>,
    default_role: Role,
    refresh_leeway_secs: i64,
    tokens: Mutex<Option<AuthSession>>,
    state: watch::Sender<AuthState>,
}

impl SessionManager {
    pub fn new(gateway: Arc<Gateway>, config: &SessionConfig) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            gateway,
            default_role: config.default_role,
            refresh_leeway_secs: config.refresh_leeway_secs,
            tokens: Mutex::new(None),
            state,
        }
    }

    /// Register for session changes. Every login, logout, refresh, and
    /// expiry publishes the new state; dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock_tokens().as_ref().map(|t| t.access_token.clone())
    }

    /// Snapshot of the active session for persistence, if any.
    pub fn stored(&self) -> Option<StoredSession> {
        self.lock_tokens().as_ref().map(StoredSession::from)
    }

    /// Resolve the persisted session at startup. An expired (or expiring)
    /// token is refreshed first; a failed refresh leaves the client
    /// unauthenticated rather than erroring.
    pub async fn restore(&self, stored: Option<StoredSession>) -> AuthState {
        let Some(stored) = stored else {
            self.state.send_replace(AuthState::Unauthenticated);
            return self.current();
        };

        let mut auth = stored.into_auth_session();
        if auth.expires_within(self.refresh_leeway_secs) {
            match self.gateway.refresh_session(&auth.refresh_token).await {
                Ok(fresh) => auth = fresh,
                Err(err) => {
                    tracing::warn!("stored session could not be refreshed: {}", err);
                    self.state.send_replace(AuthState::Unauthenticated);
                    return self.current();
                }
            }
        }

        self.install(auth).await;
        self.current()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let auth = self.gateway.password_sign_in(email, password).await?;
        Ok(self.install(auth).await)
    }

    /// Register a new account. No session is established here: the user must
    /// confirm via the out-of-band email step before signing in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        self.gateway.sign_up(email, password).await
    }

    /// Clear the session. Local state is cleared first and unconditionally;
    /// a failed remote invalidation is logged and otherwise ignored.
    pub async fn sign_out(&self) {
        let taken = self.lock_tokens().take();
        self.state.send_replace(AuthState::Unauthenticated);

        if let Some(auth) = taken {
            if let Err(err) = self.gateway.sign_out(&auth.access_token).await {
                tracing::warn!("remote sign-out failed, local session already cleared: {}", err);
            }
        }
    }

    /// Derive the coarse role for a session. Total: every outcome of the two
    /// probes (including errors) maps to exactly one role, with the
    /// configured default covering ambiguity and failure.
    pub async fn resolve_role(&self, session: &Session) -> Role {
        match self.probe_role(session).await {
            Ok(role) => role,
            Err(err) => {
                tracing::warn!(
                    "role probe failed, using configured default {}: {}",
                    self.default_role.as_str(),
                    err
                );
                self.default_role
            }
        }
    }

    async fn probe_role(&self, session: &Session) -> Result<Role, GatewayError> {
        let token = self.access_token();

        // A client record keyed by the user id means the user is a client
        let mut own = Filter::new("clients")?;
        own.eq("id", session.user_id)?.limit(1, None)?;
        let rows: Vec<serde_json::Value> = self.gateway.select(token.as_deref(), &own).await?;
        if !rows.is_empty() {
            return Ok(Role::Client);
        }

        // Any client record naming the user as advisor means IC
        let mut advised = Filter::new("clients")?;
        advised.eq("ic_id", session.user_id)?.limit(1, None)?;
        let rows: Vec<serde_json::Value> = self.gateway.select(token.as_deref(), &advised).await?;
        if !rows.is_empty() {
            return Ok(Role::Ic);
        }

        Ok(self.default_role)
    }

    async fn install(&self, auth: AuthSession) -> Session {
        let session = auth.session();
        *self.lock_tokens() = Some(auth);
        self.state.send_replace(AuthState::Authenticated {
            session: session.clone(),
            role: None,
        });

        let role = self.resolve_role(&session).await;
        self.state.send_replace(AuthState::Authenticated {
            session: session.clone(),
            role: Some(role),
        });

        session
    }

    fn lock_tokens(&self) -> std::sync::MutexGuard<'_, Option<AuthSession>> {
        self.tokens.lock().expect("session token lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: Uuid::nil(),
            email: "user@example.com".into(),
        }
    }

    #[test]
    fn auth_state_accessors() {
        assert!(AuthState::Loading.session().is_none());
        assert!(AuthState::Unauthenticated.session().is_none());

        let state = AuthState::Authenticated {
            session: session(),
            role: None,
        };
        assert_eq!(state.session(), Some(&session()));
        assert_eq!(state.role(), None);

        let resolved = AuthState::Authenticated {
            session: session(),
            role: Some(Role::Client),
        };
        assert_eq!(resolved.role(), Some(Role::Client));
    }
}
