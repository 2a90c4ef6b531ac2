//! Session provider backed by the hosted auth REST API (`/auth/v1`).

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::session::{
    AccessToken, AuthError, Session, SessionProvider, SessionUser,
};
use crate::infra::hosted::{HostedCtx, HostedErrorBody};

pub(crate) const METRIC_AUTH_REQUESTS: &str = "blogcraft_auth_requests_total";

#[derive(Clone, Debug)]
pub struct RestSessionProvider {
    ctx: HostedCtx,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserResponse> for SessionUser {
    fn from(user: UserResponse) -> Self {
        Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }
    }
}

impl RestSessionProvider {
    pub fn new(ctx: HostedCtx) -> Self {
        Self { ctx }
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, AuthError> {
        self.ctx
            .url(path)
            .map_err(|err| AuthError::Protocol(format!("invalid auth url: {err}")))
    }

    /// Admin rights come from a `user_roles` row, read with the user's own token.
    async fn is_admin(&self, user_id: Uuid, token: &AccessToken) -> Result<bool, AuthError> {
        let mut url = self.endpoint("rest/v1/user_roles")?;
        url.query_pairs_mut()
            .append_pair("select", "role")
            .append_pair("user_id", &format!("eq.{user_id}"))
            .append_pair("role", "eq.admin");

        let response = self
            .ctx
            .request(Method::GET, url, Some(token.as_str()))
            .send()
            .await;
        let (status, bytes) = record("roles", read(response).await)?;
        if !status.is_success() {
            return Err(unexpected_status(status, &bytes));
        }
        let rows: Vec<Value> = serde_json::from_slice(&bytes)
            .map_err(|err| AuthError::Protocol(format!("invalid roles response: {err}")))?;
        Ok(!rows.is_empty())
    }

    async fn session_for(
        &self,
        user: UserResponse,
        token: AccessToken,
    ) -> Result<Session, AuthError> {
        let is_admin = self.is_admin(user.id, &token).await?;
        Ok(Session {
            user: user.into(),
            token,
            is_admin,
        })
    }
}

#[async_trait]
impl SessionProvider for RestSessionProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .ctx
            .request(Method::POST, url, None)
            .json(&PasswordGrant { email, password })
            .send()
            .await;
        let (status, bytes) = record("sign_in", read(response).await)?;

        match status {
            status if status.is_success() => {
                let body: TokenResponse = serde_json::from_slice(&bytes).map_err(|err| {
                    AuthError::Protocol(format!("invalid token response: {err}"))
                })?;
                let token = AccessToken::new(body.access_token);
                self.session_for(body.user, token).await
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                debug!(target: "blogcraft::auth", "password grant rejected");
                Err(AuthError::InvalidCredentials)
            }
            status => Err(unexpected_status(status, &bytes)),
        }
    }

    async fn resolve(&self, token: &AccessToken) -> Result<Option<Session>, AuthError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .ctx
            .request(Method::GET, url, Some(token.as_str()))
            .send()
            .await;
        let (status, bytes) = record("resolve", read(response).await)?;

        match status {
            status if status.is_success() => {
                let user: UserResponse = serde_json::from_slice(&bytes).map_err(|err| {
                    AuthError::Protocol(format!("invalid user response: {err}"))
                })?;
                self.session_for(user, token.clone()).await.map(Some)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(unexpected_status(status, &bytes)),
        }
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .ctx
            .request(Method::POST, url, Some(token.as_str()))
            .send()
            .await;
        let (status, bytes) = record("sign_out", read(response).await)?;

        // An already expired token is as good as signed out.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(unexpected_status(status, &bytes))
        }
    }
}

async fn read(
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<(StatusCode, bytes::Bytes), AuthError> {
    let response = response.map_err(AuthError::unavailable)?;
    let status = response.status();
    let bytes = response.bytes().await.map_err(AuthError::unavailable)?;
    Ok((status, bytes))
}

fn record(
    op: &'static str,
    result: Result<(StatusCode, bytes::Bytes), AuthError>,
) -> Result<(StatusCode, bytes::Bytes), AuthError> {
    let outcome = match &result {
        Ok((status, _)) if status.is_success() => "ok",
        Ok(_) => "rejected",
        Err(_) => "error",
    };
    counter!(METRIC_AUTH_REQUESTS, "op" => op, "outcome" => outcome).increment(1);
    result
}

fn unexpected_status(status: StatusCode, bytes: &[u8]) -> AuthError {
    let message = HostedErrorBody::parse(bytes).describe(status);
    warn!(
        target: "blogcraft::auth",
        status = status.as_u16(),
        error = %message,
        "auth request failed"
    );
    if status.is_server_error() {
        AuthError::Unavailable(message)
    } else {
        AuthError::Protocol(message)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    const USER_ID: &str = "0b6f2e8a-3c55-4b0e-9a53-5f1f1e8f9c11";

    fn provider(server: &MockServer) -> RestSessionProvider {
        let ctx = HostedCtx::new(&server.base_url(), "anon-key", Duration::from_secs(5))
            .expect("ctx");
        RestSessionProvider::new(ctx)
    }

    fn mock_roles<'a>(server: &'a MockServer, token: &str, rows: &str) -> httpmock::Mock<'a> {
        let rows = rows.to_string();
        let bearer = format!("Bearer {token}");
        server.mock(move |when, then| {
            when.method("GET")
                .path("/rest/v1/user_roles")
                .query_param("select", "role")
                .query_param("user_id", format!("eq.{USER_ID}"))
                .query_param("role", "eq.admin")
                .header("authorization", bearer);
            then.status(200).body(rows);
        })
    }

    #[tokio::test]
    async fn sign_in_exchanges_password_and_checks_role() {
        let server = MockServer::start();
        let token = server.mock(|when, then| {
            when.method("POST")
                .path("/auth/v1/token")
                .query_param("grant_type", "password")
                .header("apikey", "anon-key")
                .json_body(json!({"email": "admin@example.com", "password": "secret"}));
            then.status(200).json_body(json!({
                "access_token": "user-token",
                "token_type": "bearer",
                "user": {"id": USER_ID, "email": "admin@example.com"}
            }));
        });
        let roles = mock_roles(&server, "user-token", r#"[{"role":"admin"}]"#);

        let session = provider(&server)
            .sign_in("admin@example.com", "secret")
            .await
            .expect("session");

        token.assert();
        roles.assert();
        assert!(session.is_admin);
        assert_eq!(session.user.email, "admin@example.com");
        assert_eq!(session.token.as_str(), "user-token");
    }

    #[tokio::test]
    async fn rejected_grant_is_invalid_credentials() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST").path("/auth/v1/token");
            then.status(400).json_body(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            }));
        });

        let err = provider(&server)
            .sign_in("admin@example.com", "wrong")
            .await
            .expect_err("rejected");
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn resolve_without_role_row_is_not_admin() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET")
                .path("/auth/v1/user")
                .header("authorization", "Bearer reader-token");
            then.status(200)
                .json_body(json!({"id": USER_ID, "email": "reader@example.com"}));
        });
        mock_roles(&server, "reader-token", "[]");

        let session = provider(&server)
            .resolve(&AccessToken::new("reader-token"))
            .await
            .expect("resolve")
            .expect("session");
        assert!(!session.is_admin);
    }

    #[tokio::test]
    async fn expired_token_resolves_to_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/auth/v1/user");
            then.status(401).json_body(json!({"msg": "JWT expired"}));
        });

        let resolved = provider(&server)
            .resolve(&AccessToken::new("stale"))
            .await
            .expect("resolve");
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn sign_out_posts_logout_with_user_token() {
        let server = MockServer::start();
        let logout = server.mock(|when, then| {
            when.method("POST")
                .path("/auth/v1/logout")
                .header("authorization", "Bearer user-token");
            then.status(204);
        });

        provider(&server)
            .sign_out(&AccessToken::new("user-token"))
            .await
            .expect("sign out");
        logout.assert();
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/auth/v1/user");
            then.status(503).body("maintenance");
        });

        let err = provider(&server)
            .resolve(&AccessToken::new("token"))
            .await
            .expect_err("unavailable");
        assert!(matches!(err, AuthError::Unavailable(message) if message == "maintenance"));
    }
}
