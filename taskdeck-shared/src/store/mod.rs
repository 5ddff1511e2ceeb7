//! Storage seam for users, sessions and tasks
//!
//! Handlers and the session service only talk to the [`Store`] trait object,
//! so the same code runs against PostgreSQL ([`PgStore`]) in production and
//! against [`MemoryStore`] in tests or with `DATABASE_URL=memory://`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use taskdeck_shared::store::{MemoryStore, Store};
//!
//! let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
//! # let _ = store;
//! ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CreateTask, CreateUser, SessionToken, Task, TaskFilter, UpdateTask, UpdateUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// PostgreSQL error code for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another user already has this email
    #[error("Email is already in use")]
    DuplicateEmail,

    /// Backend failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let is_unique = db_err.code().as_deref() == Some(UNIQUE_VIOLATION);
            let on_email = db_err
                .constraint()
                .map(|name| name.contains("email"))
                .unwrap_or(false);

            if is_unique && on_email {
                return StoreError::DuplicateEmail;
            }
        }

        StoreError::Database(err.to_string())
    }
}

/// User accounts, avatars and session tokens
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; fails with [`StoreError::DuplicateEmail`] if taken
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Looks up by an already normalized email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Applies the non-None fields; None if the user doesn't exist
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError>;

    /// Removes the user together with their tasks and sessions
    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Replaces or clears the avatar; false if the user doesn't exist
    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, StoreError>;

    async fn find_avatar(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError>;

    /// Appends a token to the user's session set
    async fn add_session(
        &self,
        id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<SessionToken, StoreError>;

    async fn session_exists(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// The user's live tokens, oldest first
    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<SessionToken>, StoreError>;

    async fn remove_session(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    async fn remove_all_sessions(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

/// Owner-scoped task records
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError>;

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError>;

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Task>, StoreError>;

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError>;
}

/// Full storage backend as held by the API
#[async_trait]
pub trait Store: UserStore + TaskStore {
    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}
