//! # Taskdeck API Server Library
//!
//! HTTP layer of Taskdeck: accounts, sessions, avatars and per-user tasks.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and the auth layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
