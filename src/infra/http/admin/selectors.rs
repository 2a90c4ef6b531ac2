//! Shared CSS selectors used by admin Datastar responses.

pub const TOAST_STACK: &str = "[data-admin-toast=\"stack\"]";

pub const POSTS_PANEL: &str = "[data-admin-panel=\"posts\"]";

pub const EDITOR_PANEL: &str = "#editor-panel";
pub const SLUG_FIELD: &str = "#editor-slug-field";
