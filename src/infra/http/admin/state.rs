use std::sync::Arc;

use crate::application::admin::{editor::EditorService, posts::AdminPostService};
use crate::presentation::views::SiteChrome;

#[derive(Clone)]
pub struct AdminState {
    pub posts: Arc<AdminPostService>,
    pub editor: Arc<EditorService>,
    pub site: SiteChrome,
}
