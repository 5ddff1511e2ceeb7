//! # Taskdeck Shared Library
//!
//! Domain types and storage shared by the Taskdeck API.
//!
//! ## Module Organization
//!
//! - `models`: users, session tokens and tasks, with their PostgreSQL queries
//! - `store`: storage traits with PostgreSQL and in-memory backends
//! - `auth`: password hashing, session tokens and bearer authentication
//! - `avatar`: avatar image validation and resizing
//! - `db`: connection pool and migrations

pub mod auth;
pub mod avatar;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
