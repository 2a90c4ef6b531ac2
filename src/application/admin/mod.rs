//! Application services for the administrative surface.

pub mod editor;
pub mod posts;
