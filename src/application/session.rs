//! Session port: who is signed in and whether they may administer posts.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Bearer token issued by the auth provider. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: SessionUser,
    pub token: AccessToken,
    pub is_admin: bool,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected auth response: {0}")]
    Protocol(String),
}

impl AuthError {
    pub fn unavailable(err: impl fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Resolve a previously issued token. `None` when the token is no longer valid.
    async fn resolve(&self, token: &AccessToken) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError>;
}

/// Read-only session context attached to every request.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(Option<Arc<Session>>);

impl CurrentSession {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn signed_in(session: Session) -> Self {
        Self(Some(Arc::new(session)))
    }

    pub fn session(&self) -> Option<&Session> {
        self.0.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.session().map(|session| &session.user)
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.session().map(|session| &session.token)
    }

    pub fn is_admin(&self) -> bool {
        self.session().is_some_and(|session| session.is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-value");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
    }

    #[test]
    fn anonymous_session_is_not_admin() {
        let session = CurrentSession::anonymous();
        assert!(session.user().is_none());
        assert!(!session.is_admin());
    }
}
