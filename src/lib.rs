//! A minimal blog: a public reading surface and an admin authoring surface
//! over a hosted posts table.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
