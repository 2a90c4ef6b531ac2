//! Create/edit form backed by a server-side editor session.

use std::sync::Arc;

use askama::Template;
use axum::{
    Extension, Form,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::{
        admin::editor::{EditorField, EditorSlot, SessionLookupError},
        error::HttpError,
        session::{CurrentSession, Session},
        stream::StreamBuilder,
    },
    infra::http::{is_datastar_request, repo_error_to_http},
    presentation::{
        admin::views::{
            AdminEditorPanelTemplate, AdminEditorTemplate, AdminEditorView, AdminLayout,
            AdminSlugFieldTemplate,
        },
        views::{LayoutChrome, render_not_found_response, render_template_response},
    },
};

use super::{
    AdminSession, AdminState,
    forms::EditorForm,
    selectors::{EDITOR_PANEL, SLUG_FIELD},
    shared::{
        Toast, dashboard_location, redirect_to_dashboard, stream_navigate,
        stream_patch_with_toasts, stream_toasts, template_render_http_error,
    },
};

pub(super) async fn admin_post_new(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    AdminSession(session): AdminSession,
) -> Response {
    let slot = state.editor.open_create(&session);
    let view = AdminEditorView::new(slot.id(), &*slot.lock().await);
    render_editor_page(state.site.layout(&current), view, StatusCode::OK)
}

pub(super) async fn admin_post_edit(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
) -> Response {
    let chrome = state.site.layout(&current);
    match state.editor.open_edit(&session, id).await {
        Ok(Some((slot, _))) => {
            let view = AdminEditorView::new(slot.id(), &*slot.lock().await);
            render_editor_page(chrome, view, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => repo_error_to_http("infra::http::admin::editor::admin_post_edit", err)
            .into_response(),
    }
}

/// Live edit of a single field. Only a title change that the slug follows
/// sends anything back; the slug input is never echoed while being typed.
pub(super) async fn admin_editor_field(
    State(state): State<AdminState>,
    AdminSession(session): AdminSession,
    Path((session_id, field)): Path<(Uuid, String)>,
    Form(form): Form<EditorForm>,
) -> Response {
    let field = match field.parse::<EditorField>() {
        Ok(field) => field,
        Err(err) => {
            return HttpError::new(
                "infra::http::admin::editor::admin_editor_field",
                StatusCode::BAD_REQUEST,
                "Unknown editor field",
                err.to_string(),
            )
            .into_response();
        }
    };
    let slot = match lookup_slot(&state, &session, session_id) {
        Ok(slot) => slot,
        Err(err) => return err.into_response(),
    };

    let mut editor = slot.lock().await;
    if let Err(err) = editor.apply(field, form.value_of(field)) {
        return stream_toasts(&[Toast::error(err.to_string())]);
    }
    debug!(
        target: "blogcraft::http::editor",
        session = %slot.id(),
        field = field.as_str(),
        "editor field applied"
    );

    if field != EditorField::Title || !editor.slug_follows_title() {
        return StreamBuilder::new().into_response();
    }

    let content = AdminEditorView::new(slot.id(), &editor);
    drop(editor);
    match (AdminSlugFieldTemplate { content }).render() {
        Ok(html) => stream_patch_with_toasts(SLUG_FIELD, html, &[]),
        Err(err) => template_render_http_error(
            "infra::http::admin::editor::admin_editor_field",
            "Template rendering failed",
            err,
        )
        .into_response(),
    }
}

pub(super) async fn admin_editor_submit(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    AdminSession(session): AdminSession,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<EditorForm>,
) -> Response {
    let slot = match lookup_slot(&state, &session, session_id) {
        Ok(slot) => slot,
        Err(err) => return err.into_response(),
    };
    let datastar = is_datastar_request(&headers);

    let synced = slot.lock().await.sync_form(&form.into_draft());
    let result = match synced {
        Ok(()) => state.editor.submit(&slot, &session).await,
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(mutation) => {
            state.editor.sessions().discard(slot.id(), session.user.id);
            let toast = Toast::success(mutation.message);
            if datastar {
                stream_navigate(&dashboard_location(&toast))
            } else {
                redirect_to_dashboard(&toast)
            }
        }
        Err(err) => {
            let message = err.to_string();
            let view = AdminEditorView::new(slot.id(), &*slot.lock().await)
                .with_error(message.clone(), err.field());
            if !datastar {
                return render_editor_page(
                    state.site.layout(&current),
                    view,
                    StatusCode::UNPROCESSABLE_ENTITY,
                );
            }
            match (AdminEditorPanelTemplate { content: view }).render() {
                Ok(html) => stream_patch_with_toasts(EDITOR_PANEL, html, &[Toast::error(message)]),
                Err(err) => template_render_http_error(
                    "infra::http::admin::editor::admin_editor_submit",
                    "Template rendering failed",
                    err,
                )
                .into_response(),
            }
        }
    }
}

pub(super) async fn admin_editor_cancel(
    State(state): State<AdminState>,
    AdminSession(session): AdminSession,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    state.editor.sessions().discard(session_id, session.user.id);
    if is_datastar_request(&headers) {
        stream_navigate("/admin")
    } else {
        Redirect::to("/admin").into_response()
    }
}

fn lookup_slot(
    state: &AdminState,
    session: &Session,
    session_id: Uuid,
) -> Result<Arc<EditorSlot>, HttpError> {
    state
        .editor
        .sessions()
        .get(session_id, session.user.id)
        .map_err(|err| {
            let status = match err {
                SessionLookupError::NotFound => StatusCode::NOT_FOUND,
                SessionLookupError::Forbidden => StatusCode::FORBIDDEN,
            };
            HttpError::new(
                "infra::http::admin::editor::lookup_slot",
                status,
                "Editor session unavailable",
                err.to_string(),
            )
        })
}

fn render_editor_page(chrome: LayoutChrome, content: AdminEditorView, status: StatusCode) -> Response {
    let view = AdminLayout::new(chrome, content);
    render_template_response(AdminEditorTemplate { view }, status)
}
