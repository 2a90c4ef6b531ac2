mod dashboard;
mod editor;
mod forms;
mod selectors;
mod shared;
mod state;

pub use state::AdminState;

use axum::{
    Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    middleware,
    routing::{get, post},
};

use crate::application::{
    error::HttpError,
    session::{CurrentSession, Session},
};

use super::{RouterState, middleware::require_admin};

pub(super) fn routes(state: AdminState) -> Router<RouterState> {
    Router::new()
        .route("/admin", get(dashboard::admin_dashboard))
        .route(
            "/admin/posts/{id}/publish",
            post(dashboard::admin_post_toggle_publish),
        )
        .route(
            "/admin/posts/{id}/delete",
            get(dashboard::admin_post_delete_confirm).post(dashboard::admin_post_delete),
        )
        .route("/admin/new", get(editor::admin_post_new))
        .route("/admin/edit/{id}", get(editor::admin_post_edit))
        .route(
            "/admin/editor/{session}/fields/{field}",
            post(editor::admin_editor_field),
        )
        .route(
            "/admin/editor/{session}/submit",
            post(editor::admin_editor_submit),
        )
        .route(
            "/admin/editor/{session}/cancel",
            post(editor::admin_editor_cancel),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// The signed-in admin behind an `/admin` request.
pub(super) struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .filter(|current| current.is_admin())
            .and_then(CurrentSession::session)
            .cloned()
            .map(AdminSession)
            .ok_or_else(|| {
                HttpError::new(
                    "infra::http::admin::AdminSession",
                    StatusCode::FORBIDDEN,
                    "Admin access required",
                    "request reached an admin handler without an admin session",
                )
            })
    }
}
