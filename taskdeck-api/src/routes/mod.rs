//! API route handlers
//!
//! - `health`: Health check endpoint
//! - `users`: Signup, login, sessions, profile and avatar endpoints
//! - `tasks`: Owner-scoped task endpoints

pub mod health;
pub mod tasks;
pub mod users;
