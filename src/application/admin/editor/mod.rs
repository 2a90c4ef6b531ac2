//! Post editor: draft state, live sessions and the submit path.

mod controller;
mod service;
mod sessions;
pub mod types;

pub use controller::{Draft, PostEditor, SubmitPlan, parse_flag};
pub use service::EditorService;
pub use sessions::{EditorSessions, EditorSlot, SessionLookupError};
pub use types::{
    EditorError, EditorField, EditorMode, SLUG_TAKEN_MESSAGE, SubmitError, UnknownField,
};
