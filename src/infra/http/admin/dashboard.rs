//! Post table: listing, publish toggle and delete.

use askama::Template;
use axum::{
    Extension,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    application::{
        admin::posts::AdminPostError,
        query::Mutation,
        session::{CurrentSession, Session},
    },
    domain::entities::PostRecord,
    infra::http::is_datastar_request,
    presentation::{
        admin::views::{
            AdminDashboardTemplate, AdminDeleteConfirmTemplate, AdminDeleteConfirmView,
            AdminLayout, AdminPostRowView, AdminPostsPanelTemplate,
        },
        views::{ListView, render_not_found_response, render_template_response},
    },
};

use super::{
    AdminSession, AdminState,
    selectors::POSTS_PANEL,
    shared::{
        NoticeQuery, Toast, redirect_to_dashboard, stream_patch_with_toasts,
        template_render_http_error, toast_items,
    },
};

pub(super) async fn admin_dashboard(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    AdminSession(session): AdminSession,
    Query(notice): Query<NoticeQuery>,
) -> Response {
    let posts = state.posts.list(&session).await;
    let content = ListView::from_state(posts, AdminPostRowView::from);
    let view = AdminLayout::new(state.site.layout(&current), content)
        .with_toasts(toast_items(&notice.toasts()));
    render_template_response(AdminDashboardTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_post_toggle_publish(
    State(state): State<AdminState>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let result = state.posts.toggle_publish(&session, id).await;
    respond_with_outcome(&state, &session, &headers, result, "Failed to update post").await
}

pub(super) async fn admin_post_delete(
    State(state): State<AdminState>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let result = state.posts.delete(&session, id).await;
    respond_with_outcome(&state, &session, &headers, result, "Failed to delete post").await
}

/// Confirmation page for browsers that cannot run the inline `confirm()`.
pub(super) async fn admin_post_delete_confirm(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
) -> Response {
    let chrome = state.site.layout(&current);
    match state.posts.find(&session, id).await {
        Ok(Some(post)) => {
            let view = AdminLayout::new(chrome, AdminDeleteConfirmView::from(post));
            render_template_response(AdminDeleteConfirmTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => {
            let toast = Toast::error(format!("Failed to delete post: {err}"));
            redirect_to_dashboard(&toast)
        }
    }
}

/// Toast the mutation outcome, then refresh the table (datastar) or
/// redirect back to the dashboard (plain form post).
async fn respond_with_outcome(
    state: &AdminState,
    session: &Session,
    headers: &HeaderMap,
    result: Result<Mutation<PostRecord>, AdminPostError>,
    failure_prefix: &str,
) -> Response {
    let toast = match result {
        Ok(mutation) => Toast::success(mutation.message),
        Err(err) => Toast::error(format!("{failure_prefix}: {err}")),
    };

    if !is_datastar_request(headers) {
        return redirect_to_dashboard(&toast);
    }

    let posts = state.posts.list(session).await;
    let content = ListView::from_state(posts, AdminPostRowView::from);
    let html = match (AdminPostsPanelTemplate { content }).render() {
        Ok(html) => html,
        Err(err) => {
            return template_render_http_error(
                "infra::http::admin::dashboard::respond_with_outcome",
                "Template rendering failed",
                err,
            )
            .into_response();
        }
    };
    stream_patch_with_toasts(POSTS_PANEL, html, &[toast])
}
