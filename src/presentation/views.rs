use crate::application::error::{ErrorReport, HttpError};
use crate::application::session::CurrentSession;
use crate::application::view_state::ViewState;
use crate::config::SiteSettings;
use crate::domain::entities::PostRecord;
use crate::domain::posts::{content_paragraphs, format_human_date};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

pub const NOT_FOUND_HEADING: &str = "Post not found";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let view = LayoutContext::new(chrome, ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

pub fn render_forbidden_response(chrome: LayoutChrome) -> Response {
    let view = LayoutContext::new(chrome, ErrorPageView::forbidden());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::FORBIDDEN);
    ErrorReport::from_message(
        "presentation::views::render_forbidden_response",
        StatusCode::FORBIDDEN,
        "Admin access required",
    )
    .attach(&mut response);
    response
}

/// Site-wide settings every page header needs.
#[derive(Clone, Debug)]
pub struct SiteChrome {
    pub title: String,
    pub show_login_button: bool,
}

impl From<&SiteSettings> for SiteChrome {
    fn from(site: &SiteSettings) -> Self {
        Self {
            title: site.title.clone(),
            show_login_button: site.show_login_button,
        }
    }
}

impl SiteChrome {
    pub fn layout(&self, session: &CurrentSession) -> LayoutChrome {
        LayoutChrome {
            site_title: self.title.clone(),
            show_login_button: self.show_login_button,
            signed_in: session.user().is_some(),
            is_admin: session.is_admin(),
            user_email: session
                .user()
                .map(|user| user.email.clone())
                .unwrap_or_default(),
        }
    }
}

/// Header state for one rendered page.
#[derive(Clone)]
pub struct LayoutChrome {
    pub site_title: String,
    pub show_login_button: bool,
    pub signed_in: bool,
    pub is_admin: bool,
    pub user_email: String,
}

impl LayoutChrome {
    pub fn shows_login(&self) -> bool {
        !self.signed_in && self.show_login_button
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub chrome: LayoutChrome,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self { chrome, content }
    }
}

/// Which branch of a list view to render.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Error,
    Empty,
    Ready,
}

impl ListStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Error => "error",
            Self::Empty => "empty",
            Self::Ready => "ready",
        }
    }
}

/// A list body derived from a [`ViewState`].
#[derive(Clone)]
pub struct ListView<T> {
    pub status: &'static str,
    pub message: String,
    pub items: Vec<T>,
}

impl<T> ListView<T> {
    pub fn from_state<R>(state: ViewState<Vec<R>>, item: impl Fn(R) -> T) -> Self {
        let (status, message, items) = match state {
            ViewState::Loading => (ListStatus::Loading, String::new(), Vec::new()),
            ViewState::Error(message) => (ListStatus::Error, message, Vec::new()),
            ViewState::Empty => (ListStatus::Empty, String::new(), Vec::new()),
            ViewState::Ready(rows) => (
                ListStatus::Ready,
                String::new(),
                rows.into_iter().map(item).collect(),
            ),
        };
        Self {
            status: status.as_str(),
            message,
            items,
        }
    }
}

#[derive(Clone)]
pub struct PostCardView {
    pub href: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub image_url: String,
}

impl From<PostRecord> for PostCardView {
    fn from(post: PostRecord) -> Self {
        Self {
            href: format!("/blog/{}", post.slug),
            date: format_human_date(post.created_at),
            title: post.title,
            excerpt: post.excerpt.unwrap_or_default(),
            image_url: post.image_url.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<ListView<PostCardView>>,
}

#[derive(Clone)]
pub struct PostDetailView {
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub image_url: String,
    pub paragraphs: Vec<String>,
}

impl From<PostRecord> for PostDetailView {
    fn from(post: PostRecord) -> Self {
        Self {
            date: format_human_date(post.created_at),
            paragraphs: content_paragraphs(&post.content)
                .into_iter()
                .map(str::to_string)
                .collect(),
            title: post.title,
            excerpt: post.excerpt.unwrap_or_default(),
            image_url: post.image_url.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailView>,
}

#[derive(Clone)]
pub struct LoginView {
    pub email: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "auth.html")]
pub struct LoginTemplate {
    pub view: LayoutContext<LoginView>,
}

#[derive(Clone)]
pub struct ErrorPageView {
    pub code: u16,
    pub heading: &'static str,
    pub message: &'static str,
    pub action_label: &'static str,
    pub action_href: &'static str,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            code: 404,
            heading: NOT_FOUND_HEADING,
            message: "The post you're looking for doesn't exist.",
            action_label: "Back to Home",
            action_href: "/",
        }
    }

    pub fn forbidden() -> Self {
        Self {
            code: 403,
            heading: "Access denied",
            message: "You need admin access to view this page.",
            action_label: "Back to Home",
            action_href: "/",
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
