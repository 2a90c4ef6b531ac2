use askama::Template;

use crate::domain::entities::PostRecord;
use crate::domain::posts::format_short_date;
use crate::presentation::views::ListView;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminPostRowView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
    pub created: String,
    pub edit_href: String,
    pub publish_action: String,
    pub publish_label: &'static str,
    pub delete_action: String,
    pub confirm_message: String,
}

impl AdminPostRowView {
    pub fn status_label(&self) -> &'static str {
        if self.is_published {
            "Published"
        } else {
            "Draft"
        }
    }
}

impl From<PostRecord> for AdminPostRowView {
    fn from(post: PostRecord) -> Self {
        let id = post.id.to_string();
        Self {
            edit_href: format!("/admin/edit/{id}"),
            publish_action: format!("/admin/posts/{id}/publish"),
            publish_label: if post.is_published {
                "Unpublish"
            } else {
                "Publish"
            },
            delete_action: format!("/admin/posts/{id}/delete"),
            confirm_message: delete_confirmation(&post.title),
            created: format_short_date(post.created_at),
            is_published: post.is_published,
            slug: post.slug,
            title: post.title,
            id,
        }
    }
}

pub fn delete_confirmation(title: &str) -> String {
    format!("Are you sure you want to delete \"{title}\"? This action cannot be undone.")
}

pub type AdminPostListView = ListView<AdminPostRowView>;

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub view: AdminLayout<AdminPostListView>,
}

#[derive(Template)]
#[template(path = "admin/posts_panel.html")]
pub struct AdminPostsPanelTemplate {
    pub content: AdminPostListView,
}

#[derive(Clone)]
pub struct AdminDeleteConfirmView {
    pub title: String,
    pub message: String,
    pub delete_action: String,
}

impl From<PostRecord> for AdminDeleteConfirmView {
    fn from(post: PostRecord) -> Self {
        Self {
            message: delete_confirmation(&post.title),
            delete_action: format!("/admin/posts/{}/delete", post.id),
            title: post.title,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/delete_confirm.html")]
pub struct AdminDeleteConfirmTemplate {
    pub view: AdminLayout<AdminDeleteConfirmView>,
}
