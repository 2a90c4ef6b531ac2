use std::sync::Arc;

use axum::{
    Extension, Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    application::session::{AuthError, CurrentSession, SessionProvider},
    config::AuthSettings,
    presentation::views::{
        LayoutContext, LoginTemplate, LoginView, SiteChrome, render_template_response,
    },
};

use super::RouterState;

/// How the session cookie is written.
#[derive(Clone, Debug)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
}

impl From<&AuthSettings> for SessionCookie {
    fn from(settings: &AuthSettings) -> Self {
        Self {
            name: settings.cookie_name.clone(),
            secure: settings.cookie_secure,
        }
    }
}

impl SessionCookie {
    fn issue(&self, token: &str) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    fn removal(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub provider: Arc<dyn SessionProvider>,
    pub cookie: SessionCookie,
    pub site: SiteChrome,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub(super) fn routes() -> Router<RouterState> {
    Router::new()
        .route("/auth", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

async fn login_page(
    State(state): State<AuthState>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    if current.is_admin() {
        return Redirect::to("/admin").into_response();
    }
    render_login(&state, &current, String::new(), String::new(), StatusCode::OK)
}

async fn login(
    State(state): State<AuthState>,
    Extension(current): Extension<CurrentSession>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return render_login(
            &state,
            &current,
            email,
            "Please enter your email and password".to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    match state.provider.sign_in(&email, &form.password).await {
        Ok(session) => {
            info!(
                target: "blogcraft::http::auth",
                user_id = %session.user.id,
                is_admin = session.is_admin,
                "user signed in"
            );
            let destination = if session.is_admin { "/admin" } else { "/" };
            let jar = jar.add(state.cookie.issue(session.token.as_str()));
            (jar, Redirect::to(destination)).into_response()
        }
        Err(AuthError::InvalidCredentials) => render_login(
            &state,
            &current,
            email,
            AuthError::InvalidCredentials.to_string(),
            StatusCode::UNAUTHORIZED,
        ),
        Err(err) => {
            warn!(target: "blogcraft::http::auth", error = %err, "sign in failed");
            render_login(
                &state,
                &current,
                email,
                "Sign in is unavailable right now. Please try again later.".to_string(),
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}

async fn logout(
    State(state): State<AuthState>,
    Extension(current): Extension<CurrentSession>,
    jar: CookieJar,
) -> Response {
    if let Some(token) = current.token()
        && let Err(err) = state.provider.sign_out(token).await
    {
        // The cookie is cleared regardless; the token simply expires upstream.
        warn!(target: "blogcraft::http::auth", error = %err, "sign out failed");
    }
    let jar = jar.remove(state.cookie.removal());
    (jar, Redirect::to("/")).into_response()
}

fn render_login(
    state: &AuthState,
    current: &CurrentSession,
    email: String,
    error: String,
    status: StatusCode,
) -> Response {
    let view = LayoutContext::new(state.site.layout(current), LoginView { email, error });
    render_template_response(LoginTemplate { view }, status)
}
