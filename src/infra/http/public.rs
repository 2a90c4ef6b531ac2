use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
};

use crate::{
    application::{feed::FeedService, session::CurrentSession, view_state::ViewState},
    presentation::views::{
        IndexTemplate, LayoutContext, ListView, PostCardView, PostDetailView, PostTemplate,
        SiteChrome, render_not_found_response, render_template_response,
    },
};

use super::RouterState;

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub site: SiteChrome,
}

pub(super) fn routes() -> Router<RouterState> {
    Router::new()
        .route("/", get(index))
        .route("/blog/{slug}", get(post_detail))
}

async fn index(
    State(state): State<HttpState>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    let posts = state.feed.published_posts().await;
    let content = ListView::from_state(posts, PostCardView::from);
    let view = LayoutContext::new(state.site.layout(&current), content);
    render_template_response(IndexTemplate { view }, StatusCode::OK)
}

async fn post_detail(
    State(state): State<HttpState>,
    Extension(current): Extension<CurrentSession>,
    Path(slug): Path<String>,
) -> Response {
    let chrome = state.site.layout(&current);
    match state.feed.post_by_slug(&slug).await {
        ViewState::Ready(post) => {
            let view = LayoutContext::new(chrome, PostDetailView::from(post));
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        // Missing, unpublished and unreadable posts all look the same to readers.
        ViewState::Loading | ViewState::Empty | ViewState::Error(_) => {
            render_not_found_response(chrome)
        }
    }
}

pub(super) async fn fallback(
    State(state): State<HttpState>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    render_not_found_response(state.site.layout(&current))
}
