//! Render state for read views.

use std::fmt::Display;

use tracing::warn;

/// What a read view shows. Templates are pure functions of this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Loading,
    Error(String),
    Empty,
    Ready(T),
}

impl<T> ViewState<T> {
    /// Derive a state from a fetch result.
    ///
    /// The underlying error is logged; the view only sees `public_message`.
    pub fn from_fetch<E: Display>(
        result: Result<T, E>,
        is_empty: impl FnOnce(&T) -> bool,
        public_message: &str,
    ) -> Self {
        match result {
            Ok(value) if is_empty(&value) => Self::Empty,
            Ok(value) => Self::Ready(value),
            Err(err) => {
                warn!(target: "blogcraft::view", error = %err, "read view failed to load");
                Self::Error(public_message.to_string())
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            Self::Loading => ViewState::Loading,
            Self::Error(message) => ViewState::Error(message),
            Self::Empty => ViewState::Empty,
            Self::Ready(value) => ViewState::Ready(f(value)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> ViewState<Vec<T>> {
    /// List shorthand: an empty list renders the empty state.
    pub fn from_list<E: Display>(result: Result<Vec<T>, E>, public_message: &str) -> Self {
        Self::from_fetch(result, Vec::is_empty, public_message)
    }
}
