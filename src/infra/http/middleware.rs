use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;
use crate::application::session::{AccessToken, CurrentSession};
use crate::presentation::views::render_forbidden_response;

use super::admin::AdminState;
use super::auth::AuthState;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Resolve the session cookie into a [`CurrentSession`] extension.
///
/// Every request gets one; an unknown or expired token, or an unreachable
/// auth provider, leaves the request anonymous.
pub async fn resolve_session(
    State(auth): State<AuthState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut current = CurrentSession::anonymous();

    if let Some(cookie) = jar.get(&auth.cookie.name)
        && !cookie.value().is_empty()
    {
        let token = AccessToken::new(cookie.value());
        match auth.provider.resolve(&token).await {
            Ok(Some(session)) => current = CurrentSession::signed_in(session),
            Ok(None) => {
                debug!(target: "blogcraft::http::session", "session cookie no longer valid");
            }
            Err(err) => {
                warn!(
                    target: "blogcraft::http::session",
                    error = %err,
                    "failed to resolve session; continuing anonymously"
                );
            }
        }
    }

    request.extensions_mut().insert(current);
    next.run(request).await
}

/// Anonymous visitors are sent to sign in; signed-in non-admins get 403.
pub async fn require_admin(
    State(admin): State<AdminState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let current = request
        .extensions()
        .get::<CurrentSession>()
        .cloned()
        .unwrap_or_default();

    if current.session().is_none() {
        return Redirect::to("/auth").into_response();
    }
    if !current.is_admin() {
        return render_forbidden_response(admin.site.layout(&current));
    }

    next.run(request).await
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let user_id = request
        .extensions()
        .get::<CurrentSession>()
        .and_then(|current| current.user().map(|user| user.id.to_string()))
        .unwrap_or_default();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target: "blogcraft::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user_id = user_id,
                "request failed",
            );
        } else {
            warn!(
                target: "blogcraft::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user_id = user_id,
                "client request error",
            );
        }
    }

    response
}
