//! crates/photo_sharing_core/src/session.rs
//!
//! Turns login credentials into session tokens and session tokens back into
//! the `Session` capability that every other core operation receives.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Identity, Session};
use crate::error::{EngineError, EngineResult};
use crate::input::LoginCredentials;
use crate::ports::{Clock, CredentialStore, PasswordHasher, SessionStore};

/// Absolute lifetime of a login session.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Longest session lifetime a deployment may configure: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// What a successful login hands back to the transport layer.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionManager {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            hasher,
            clock,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Verifies the credentials and opens a new session.
    ///
    /// An unknown login name and a wrong password both yield
    /// `InvalidCredentials`.
    pub async fn login(&self, credentials: &LoginCredentials) -> EngineResult<LoginOutcome> {
        let Some(stored) = self.credentials.find_by_login(credentials.login_name()).await? else {
            return Err(EngineError::InvalidCredentials);
        };

        if !self.hasher.verify(credentials.password(), &stored.hashed_password)? {
            return Err(EngineError::InvalidCredentials);
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| EngineError::Internal("Session expiry is out of range".to_string()))?;
        self.sessions
            .create_auth_session(&token, stored.user.id, expires_at)
            .await?;

        info!(user_id = %stored.user.id, "User logged in");
        Ok(LoginOutcome {
            token,
            identity: stored.user.identity(),
            expires_at,
        })
    }

    /// Resolves a session token. Missing, unknown and expired tokens are all
    /// `Anonymous`; an expired token is removed on the way.
    pub async fn resolve(&self, token: Option<&str>) -> EngineResult<Session> {
        let Some(token) = token else {
            return Ok(Session::Anonymous);
        };
        let Some(auth_session) = self.sessions.find_auth_session(token).await? else {
            return Ok(Session::Anonymous);
        };

        if auth_session.expires_at <= self.clock.now() {
            if let Err(e) = self.sessions.delete_auth_session(token).await {
                warn!("Failed to delete expired session: {:?}", e);
            }
            return Ok(Session::Anonymous);
        }

        match self.credentials.find_by_id(auth_session.user_id).await? {
            Some(user) => Ok(Session::Authenticated(user.identity())),
            None => Ok(Session::Anonymous),
        }
    }

    /// Ends the session behind `token`.
    pub async fn logout(&self, session: &Session, token: Option<&str>) -> EngineResult<()> {
        let (Some(identity), Some(token)) = (session.identity(), token) else {
            return Err(EngineError::NotAuthenticated);
        };
        self.sessions.delete_auth_session(token).await?;
        info!(user_id = %identity.id, "User logged out");
        Ok(())
    }

    pub fn current_identity(session: &Session) -> EngineResult<Identity> {
        session.identity().cloned().ok_or(EngineError::Unauthorized)
    }
}
