//! Data models
//!
//! - [`user`]: user accounts (profile, password hash, avatar)
//! - [`session_token`]: live bearer tokens, one row per session
//! - [`task`]: owner-scoped task records plus listing filters
//!
//! Each model carries its PostgreSQL queries as associated functions taking
//! a `&PgPool`; [`crate::store::PgStore`] wires them behind the store traits.

pub mod session_token;
pub mod task;
pub mod user;

pub use session_token::SessionToken;
pub use task::{CreateTask, SortDirection, Task, TaskFilter, TaskSort, TaskSortField, UpdateTask};
pub use user::{normalize_email, CreateUser, UpdateUser, User};
