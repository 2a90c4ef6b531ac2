//! Application services layer.

pub mod admin;
pub mod error;
pub mod feed;
pub mod query;
pub mod repos;
pub mod session;
pub mod stream;
pub mod view_state;
