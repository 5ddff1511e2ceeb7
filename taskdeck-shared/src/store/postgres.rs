//! PostgreSQL store backed by the model queries

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::{
    CreateTask, CreateUser, SessionToken, Task, TaskFilter, UpdateTask, UpdateUser, User,
};

/// Store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, StoreError> {
        Ok(User::set_avatar(&self.pool, id, avatar).await?)
    }

    async fn find_avatar(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(User::find_avatar(&self.pool, id).await?)
    }

    async fn add_session(
        &self,
        id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<SessionToken, StoreError> {
        Ok(SessionToken::create(&self.pool, id, user_id, token).await?)
    }

    async fn session_exists(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(SessionToken::exists(&self.pool, id, user_id).await?)
    }

    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<SessionToken>, StoreError> {
        Ok(SessionToken::list_by_user(&self.pool, user_id).await?)
    }

    async fn remove_session(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(SessionToken::delete(&self.pool, id, user_id).await?)
    }

    async fn remove_all_sessions(&self, user_id: Uuid) -> Result<u64, StoreError> {
        Ok(SessionToken::delete_all_for_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::find_by_id_and_owner(&self.pool, id, owner).await?)
    }

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        Ok(Task::list_by_owner(&self.pool, owner, filter).await?)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Task>, StoreError> {
        Ok(Task::update(&self.pool, id, owner, data).await?)
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::delete(&self.pool, id, owner).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }
}
