mod editor;
mod posts;
mod toast;

pub use editor::*;
pub use posts::*;
pub use toast::*;

use crate::presentation::views::LayoutChrome;

/// Admin page frame: shared header plus the toasts to show on load.
#[derive(Clone)]
pub struct AdminLayout<T> {
    pub chrome: LayoutChrome,
    pub toasts: Vec<AdminToastItem>,
    pub content: T,
}

impl<T> AdminLayout<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            chrome,
            toasts: Vec::new(),
            content,
        }
    }

    pub fn with_toasts(self, toasts: Vec<AdminToastItem>) -> Self {
        Self { toasts, ..self }
    }
}
