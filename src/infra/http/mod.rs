mod admin;
mod auth;
mod middleware;
mod public;

pub use admin::AdminState;
pub use auth::{AuthState, SessionCookie};
pub use public::HttpState;

use axum::extract::FromRef;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Router, middleware as axum_middleware};

use crate::application::error::HttpError;
use crate::application::repos::RepoError;
use crate::infra::assets;

use self::middleware::{log_responses, resolve_session, set_request_context};

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

/// True when the request was issued by the datastar client and expects SSE.
fn is_datastar_request(headers: &HeaderMap) -> bool {
    headers.contains_key(DATASTAR_REQUEST_HEADER)
}

/// Map a repository error to a consistent HTTP error response.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::Duplicate { constraint } => {
            HttpError::new(source, StatusCode::CONFLICT, "Duplicate record", constraint)
        }
        RepoError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            "resource not found",
        ),
        RepoError::Unauthorized { message } => {
            HttpError::new(source, StatusCode::FORBIDDEN, "Not authorized", message)
        }
        RepoError::InvalidInput { message } => {
            HttpError::new(source, StatusCode::BAD_REQUEST, "Invalid input", message)
        }
        RepoError::Timeout => HttpError::new(
            source,
            StatusCode::GATEWAY_TIMEOUT,
            "Post store timeout",
            "Post store timeout",
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::BAD_GATEWAY,
            "Post store error",
            message,
        ),
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub http: HttpState,
    pub admin: AdminState,
    pub auth: AuthState,
}

impl FromRef<RouterState> for HttpState {
    fn from_ref(state: &RouterState) -> Self {
        state.http.clone()
    }
}

impl FromRef<RouterState> for AdminState {
    fn from_ref(state: &RouterState) -> Self {
        state.admin.clone()
    }
}

impl FromRef<RouterState> for AuthState {
    fn from_ref(state: &RouterState) -> Self {
        state.auth.clone()
    }
}

/// The whole application: public pages, sign-in, and the guarded admin area.
pub fn build_router(state: RouterState) -> Router {
    let auth_state = state.auth.clone();

    Router::new()
        .merge(public::routes())
        .merge(auth::routes())
        .merge(admin::routes(state.admin.clone()))
        .route("/_health", get(health))
        .route("/static/{*path}", get(assets::serve))
        .fallback(public::fallback)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            resolve_session,
        ))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
