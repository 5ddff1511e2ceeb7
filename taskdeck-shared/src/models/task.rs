//! Task model and database operations
//!
//! Every query here takes the owner's ID and filters on it, so a task can
//! only ever be read or changed through its owner.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     description TEXT NOT NULL CHECK (length(description) > 0),
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     owner UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, description, completed, owner, created_at, updated_at";

/// Task owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// What needs doing (trimmed, non-empty)
    pub description: String,

    /// Whether the task is done
    pub completed: bool,

    /// Owning user
    pub owner: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub description: String,
    pub completed: bool,
    pub owner: Uuid,
}

/// Input for updating a task
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Column a task listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    CreatedAt,
    UpdatedAt,
    Description,
    Completed,
}

impl TaskSortField {
    /// Column name, safe to interpolate into SQL
    pub fn column(&self) -> &'static str {
        match self {
            TaskSortField::CreatedAt => "created_at",
            TaskSortField::UpdatedAt => "updated_at",
            TaskSortField::Description => "description",
            TaskSortField::Completed => "completed",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Ordering of a task listing, parsed from `field:asc|desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub direction: SortDirection,
}

/// Error returned for an unknown sort field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot sort tasks by '{0}'")]
pub struct InvalidSortField(pub String);

impl FromStr for TaskSort {
    type Err = InvalidSortField;

    /// Anything other than an explicit `desc` sorts ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field, direction),
            None => (s, ""),
        };

        let field = match field.trim() {
            "createdAt" | "created_at" => TaskSortField::CreatedAt,
            "updatedAt" | "updated_at" => TaskSortField::UpdatedAt,
            "description" => TaskSortField::Description,
            "completed" => TaskSortField::Completed,
            other => return Err(InvalidSortField(other.to_string())),
        };

        let direction = if direction.trim() == "desc" {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };

        Ok(TaskSort { field, direction })
    }
}

/// Filter, ordering and page window for listing a user's tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks with this completion state
    pub completed: Option<bool>,

    /// Ordering; creation order when None
    pub sort: Option<TaskSort>,

    /// Maximum number of tasks to return
    pub limit: Option<i64>,

    /// Number of matching tasks to skip
    pub offset: Option<i64>,
}

impl TaskFilter {
    /// Page window where `page` counts from 0 and `size` is the page length
    ///
    /// A `size` of 0 means no limit.
    pub fn paginate(mut self, page: Option<u32>, size: Option<u32>) -> Self {
        self.limit = size.filter(|size| *size > 0).map(i64::from);
        self.offset = match (page, size) {
            (Some(page), Some(size)) => Some(i64::from(page) * i64::from(size)),
            _ => None,
        };
        self
    }
}

impl Task {
    /// Creates a task for `data.owner`
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (description, completed, owner) VALUES ($1, $2, $3) RETURNING {}",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.description)
            .bind(data.completed)
            .bind(data.owner)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID with owner isolation
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner = $2",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists an owner's tasks, applying filter, order and page window
    pub async fn list_by_owner(
        pool: &PgPool,
        owner: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {} FROM tasks WHERE owner = $1", TASK_COLUMNS);
        let mut bind_count = 1;

        if filter.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND completed = ${}", bind_count));
        }

        match filter.sort {
            Some(sort) => query.push_str(&format!(
                " ORDER BY {} {}, created_at ASC, id ASC",
                sort.field.column(),
                sort.direction.as_sql()
            )),
            None => query.push_str(" ORDER BY created_at ASC, id ASC"),
        }

        if filter.limit.is_some() {
            bind_count += 1;
            query.push_str(&format!(" LIMIT ${}", bind_count));
        }
        if filter.offset.is_some() {
            bind_count += 1;
            query.push_str(&format!(" OFFSET ${}", bind_count));
        }

        let mut q = sqlx::query_as::<_, Task>(&query).bind(owner);

        if let Some(completed) = filter.completed {
            q = q.bind(completed);
        }
        if let Some(limit) = filter.limit {
            q = q.bind(limit);
        }
        if let Some(offset) = filter.offset {
            q = q.bind(offset);
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Updates an owner's task; None if it doesn't exist or isn't theirs
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND owner = $2 RETURNING {}",
            TASK_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner);

        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes an owner's task and returns it
    pub async fn delete(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "DELETE FROM tasks WHERE id = $1 AND owner = $2 RETURNING {}",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_with_direction() {
        let sort: TaskSort = "createdAt:desc".parse().unwrap();
        assert_eq!(sort.field, TaskSortField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort: TaskSort = "description:asc".parse().unwrap();
        assert_eq!(sort.field, TaskSortField::Description);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_parse_sort_defaults_to_ascending() {
        let sort: TaskSort = "completed".parse().unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort: TaskSort = "updated_at:DESC".parse().unwrap();
        assert_eq!(sort.field, TaskSortField::UpdatedAt);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_parse_sort_rejects_unknown_field() {
        let err = "owner:desc".parse::<TaskSort>().unwrap_err();
        assert_eq!(err, InvalidSortField("owner".to_string()));
    }

    #[test]
    fn test_paginate() {
        let filter = TaskFilter::default().paginate(Some(2), Some(10));
        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.offset, Some(20));

        let filter = TaskFilter::default().paginate(None, Some(5));
        assert_eq!(filter.limit, Some(5));
        assert_eq!(filter.offset, None);

        let filter = TaskFilter::default().paginate(Some(3), Some(0));
        assert_eq!(filter.limit, None);
        assert_eq!(filter.offset, Some(0));

        // A page without a size has nothing to multiply by
        let filter = TaskFilter::default().paginate(Some(3), None);
        assert_eq!(filter.limit, None);
        assert_eq!(filter.offset, None);
    }

    #[test]
    fn test_task_serialization() {
        let owner = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            description: "Water the plants".to_string(),
            completed: false,
            owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["description"], "Water the plants");
        assert_eq!(json["completed"], false);
        assert_eq!(json["owner"], owner.to_string());
    }
}
