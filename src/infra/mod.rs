//! Infrastructure adapters and runtime bootstrap.

pub mod assets;
pub mod auth;
pub mod error;
pub mod hosted;
pub mod http;
pub mod store;
pub mod telemetry;
