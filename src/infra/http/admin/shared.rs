use askama::{Error as AskamaError, Template};
use axum::response::{IntoResponse, Redirect, Response};
use datastar::prelude::ElementPatchMode;
use serde::Deserialize;
use std::time::Duration;
use url::form_urlencoded;
use uuid::Uuid;

use super::selectors::TOAST_STACK;
use crate::{
    application::{error::HttpError, stream::StreamBuilder},
    presentation::{admin::views as admin_views, views::TemplateRenderError},
};

#[derive(Clone, Debug)]
pub(super) struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub text: String,
    pub ttl: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(6000);

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, text)
    }

    fn new(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            ttl: DEFAULT_TOAST_TTL,
        }
    }

    fn view_item(&self) -> admin_views::AdminToastItem {
        admin_views::AdminToastItem {
            id: self.id.to_string(),
            kind: self.kind.as_variant(),
            text: self.text.clone(),
            ttl_ms: self.ttl.as_millis() as u64,
        }
    }
}

pub(super) fn toast_items(toasts: &[Toast]) -> Vec<admin_views::AdminToastItem> {
    toasts.iter().map(Toast::view_item).collect()
}

pub(super) fn push_toasts(stream: &mut StreamBuilder, toasts: &[Toast]) -> Result<(), HttpError> {
    let template = admin_views::AdminToastStackTemplate {
        toasts: toast_items(toasts),
    };

    let html = template.render().map_err(|err| {
        template_render_http_error(
            "infra::http::admin::push_toasts",
            "Template rendering failed",
            err,
        )
    })?;

    stream.push_patch(html, TOAST_STACK, ElementPatchMode::Replace);
    Ok(())
}

/// A single element replacement followed by the given toasts.
pub(super) fn stream_patch_with_toasts(
    selector: &str,
    html: String,
    toasts: &[Toast],
) -> Response {
    let mut stream = StreamBuilder::new();
    stream.push_patch(html, selector, ElementPatchMode::Replace);
    if !toasts.is_empty()
        && let Err(err) = push_toasts(&mut stream, toasts)
    {
        return err.into_response();
    }
    stream.into_response()
}

pub(super) fn stream_toasts(toasts: &[Toast]) -> Response {
    let mut stream = StreamBuilder::new();
    if let Err(err) = push_toasts(&mut stream, toasts) {
        return err.into_response();
    }
    stream.into_response()
}

/// Client-side navigation for datastar requests.
pub(super) fn stream_navigate(location: &str) -> Response {
    let mut stream = StreamBuilder::new();
    let target = serde_json::to_string(location).unwrap_or_else(|_| "\"/admin\"".to_string());
    stream.push_script(format!("window.location.assign({target});"));
    stream.into_response()
}

/// Outcome message carried across a redirect for clients without JavaScript.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct NoticeQuery {
    pub(super) notice: Option<String>,
    pub(super) error: Option<String>,
}

impl NoticeQuery {
    pub(super) fn toasts(&self) -> Vec<Toast> {
        let mut toasts = Vec::new();
        if let Some(notice) = self.notice.as_deref().filter(|text| !text.is_empty()) {
            toasts.push(Toast::success(notice));
        }
        if let Some(error) = self.error.as_deref().filter(|text| !text.is_empty()) {
            toasts.push(Toast::error(error));
        }
        toasts
    }
}

/// `/admin` with the toast encoded in the query string.
pub(super) fn dashboard_location(toast: &Toast) -> String {
    let key = match toast.kind {
        ToastKind::Success => "notice",
        ToastKind::Error => "error",
    };
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, &toast.text)
        .finish();
    format!("/admin?{query}")
}

pub(super) fn redirect_to_dashboard(toast: &Toast) -> Response {
    Redirect::to(&dashboard_location(toast)).into_response()
}

pub(super) fn template_render_http_error(
    source: &'static str,
    message: &'static str,
    err: AskamaError,
) -> HttpError {
    HttpError::from(TemplateRenderError::new(source, message, err))
}
