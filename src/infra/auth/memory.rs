//! In-process session provider with accounts taken from configuration.

use async_trait::async_trait;
use dashmap::DashMap;
use subtle::ConstantTimeEq;
use tracing::info;
use uuid::Uuid;

use crate::application::session::{
    AccessToken, AuthError, Session, SessionProvider, SessionUser,
};
use crate::config::MemoryUser;

#[derive(Clone)]
struct Account {
    user: SessionUser,
    password: String,
    is_admin: bool,
}

#[derive(Default)]
pub struct MemorySessionProvider {
    accounts: Vec<Account>,
    issued: DashMap<String, Uuid>,
}

impl MemorySessionProvider {
    pub fn new(users: &[MemoryUser]) -> Self {
        let accounts = users
            .iter()
            .map(|user| Account {
                user: SessionUser {
                    id: Uuid::new_v4(),
                    email: user.email.trim().to_string(),
                },
                password: user.password.clone(),
                is_admin: user.admin,
            })
            .collect();
        Self {
            accounts,
            issued: DashMap::new(),
        }
    }

    /// Number of tokens currently valid.
    pub fn active_sessions(&self) -> usize {
        self.issued.len()
    }

    fn session_for(&self, account: &Account, token: AccessToken) -> Session {
        Session {
            user: account.user.clone(),
            token,
            is_admin: account.is_admin,
        }
    }
}

#[async_trait]
impl SessionProvider for MemorySessionProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let account = self
            .accounts
            .iter()
            .find(|account| account.user.email.eq_ignore_ascii_case(email.trim()))
            .filter(|account| bool::from(account.password.as_bytes().ct_eq(password.as_bytes())))
            .ok_or(AuthError::InvalidCredentials)?;

        let token = Uuid::new_v4().simple().to_string();
        self.issued.insert(token.clone(), account.user.id);
        info!(
            target: "blogcraft::auth",
            user_id = %account.user.id,
            is_admin = account.is_admin,
            "signed in"
        );
        Ok(self.session_for(account, AccessToken::new(token)))
    }

    async fn resolve(&self, token: &AccessToken) -> Result<Option<Session>, AuthError> {
        let Some(user_id) = self.issued.get(token.as_str()).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self
            .accounts
            .iter()
            .find(|account| account.user.id == user_id)
            .map(|account| self.session_for(account, token.clone())))
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        self.issued.remove(token.as_str());
        Ok(())
    }
}
