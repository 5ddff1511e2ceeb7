//! In-memory store
//!
//! Keeps everything behind one `RwLock`, so each operation is atomic the same
//! way a single SQL statement is. Deleting a user cascades to their tasks and
//! sessions. Tasks are kept in creation order, and sorting is stable, so ties
//! fall back to creation order like the SQL `ORDER BY` tiebreak.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, TaskStore, UserStore};
use crate::models::{
    CreateTask, CreateUser, SessionToken, SortDirection, Task, TaskFilter, TaskSortField,
    UpdateTask, UpdateUser, User,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    avatars: HashMap<Uuid, Vec<u8>>,
    sessions: Vec<SessionToken>,
    tasks: Vec<Task>,
    next_seq: i64,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Store that lives in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_tasks(a: &Task, b: &Task, field: TaskSortField) -> Ordering {
    match field {
        TaskSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        TaskSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        TaskSortField::Description => a.description.cmp(&b.description),
        TaskSortField::Completed => a.completed.cmp(&b.completed),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.email_taken(&data.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            age: data.age,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(email) = &data.email {
            if state.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        if let Some(password_hash) = data.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(age) = data.age {
            user.age = age;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;

        let removed = state.users.remove(&id);
        if removed.is_some() {
            state.avatars.remove(&id);
            state.sessions.retain(|s| s.user_id != id);
            state.tasks.retain(|t| t.owner != id);
        }

        Ok(removed)
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        let Some(user) = state.users.get_mut(&id) else {
            return Ok(false);
        };
        user.updated_at = Utc::now();

        match avatar {
            Some(bytes) => state.avatars.insert(id, bytes),
            None => state.avatars.remove(&id),
        };

        Ok(true)
    }

    async fn find_avatar(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.state.read().await.avatars.get(&id).cloned())
    }

    async fn add_session(
        &self,
        id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<SessionToken, StoreError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user_id) {
            return Err(StoreError::Database(format!(
                "user {} does not exist",
                user_id
            )));
        }

        state.next_seq += 1;
        let session = SessionToken {
            id,
            user_id,
            token: token.to_string(),
            seq: state.next_seq,
            created_at: Utc::now(),
        };
        state.sessions.push(session.clone());

        Ok(session)
    }

    async fn session_exists(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .iter()
            .any(|s| s.id == id && s.user_id == user_id))
    }

    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<SessionToken>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn remove_session(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state
            .sessions
            .retain(|s| !(s.id == id && s.user_id == user_id));
        Ok(state.sessions.len() < before)
    }

    async fn remove_all_sessions(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&data.owner) {
            return Err(StoreError::Database(format!(
                "owner {} does not exist",
                data.owner
            )));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            description: data.description,
            completed: data.completed,
            owner: data.owner,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == id && t.owner == owner)
            .cloned())
    }

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let state = self.state.read().await;

        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.owner == owner)
            .filter(|t| filter.completed.map_or(true, |c| t.completed == c))
            .cloned()
            .collect();

        if let Some(sort) = filter.sort {
            tasks.sort_by(|a, b| {
                let ord = compare_tasks(a, b, sort.field);
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);

        Ok(tasks.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Task>, StoreError> {
        let mut state = self.state.write().await;

        let Some(task) = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.owner == owner)
        else {
            return Ok(None);
        };

        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(completed) = data.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError> {
        let mut state = self.state.write().await;

        let position = state
            .tasks
            .iter()
            .position(|t| t.id == id && t.owner == owner);

        Ok(position.map(|idx| state.tasks.remove(idx)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
