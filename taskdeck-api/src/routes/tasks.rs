//! Task endpoints
//!
//! Every handler works on the authenticated user's tasks only. A task that
//! belongs to someone else is reported exactly like one that doesn't exist.
//!
//! - `POST /tasks` - Create a task
//! - `GET /tasks?completed=true&sortBy=createdAt:desc&page=0&size=10` - List tasks
//! - `GET /tasks/:id` - Read a task
//! - `PATCH /tasks/:id` - Update description and/or completed
//! - `DELETE /tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiQuery, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::{CreateTask, Task, TaskFilter, TaskSort, UpdateTask},
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    pub completed: bool,
}

/// Task update request
///
/// Only `description` and `completed` may be changed; any other field fails
/// the request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

/// List query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// `"true"` selects completed tasks; any other non-empty value selects
    /// open ones
    pub completed: Option<String>,

    /// `field:asc|desc`
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,

    /// Zero-based page index
    pub page: Option<u32>,

    /// Page size
    pub size: Option<u32>,
}

impl ListTasksQuery {
    /// Turns the raw query into a store filter
    pub fn into_filter(self) -> ApiResult<TaskFilter> {
        let sort = self
            .sort_by
            .as_deref()
            .map(str::parse::<TaskSort>)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let filter = TaskFilter {
            completed: self
                .completed
                .filter(|value| !value.is_empty())
                .map(|value| value == "true"),
            sort,
            ..Default::default()
        };

        Ok(filter.paginate(self.page, self.size))
    }
}

fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| task_not_found())
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

/// Create a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let description = req.description.trim().to_string();
    let req = CreateTaskRequest {
        description,
        ..req
    };
    req.validate()?;

    let task = state
        .store
        .create_task(CreateTask {
            description: req.description,
            completed: req.completed,
            owner: auth.user.id,
        })
        .await?;
    debug!(user_id = %auth.user.id, task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(query): ApiQuery<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = query.into_filter()?;
    let tasks = state.store.list_tasks(auth.user.id, &filter).await?;

    Ok(Json(tasks))
}

/// Read one of the caller's tasks
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = state
        .store
        .find_task(id, auth.user.id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Update one of the caller's tasks
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let req = UpdateTaskRequest {
        description: req.description.map(|d| d.trim().to_string()),
        completed: req.completed,
    };
    req.validate()?;

    let id = parse_task_id(&id)?;

    let task = state
        .store
        .update_task(
            id,
            auth.user.id,
            UpdateTask {
                description: req.description,
                completed: req.completed,
            },
        )
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Delete one of the caller's tasks, returning it
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = state
        .store
        .delete_task(id, auth.user.id)
        .await?
        .ok_or_else(task_not_found)?;
    debug!(user_id = %auth.user.id, task_id = %task.id, "Task deleted");

    Ok(Json(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_shared::models::{SortDirection, TaskSortField};

    #[test]
    fn test_query_into_filter() {
        let filter = ListTasksQuery {
            completed: Some("true".to_string()),
            sort_by: Some("createdAt:desc".to_string()),
            page: Some(2),
            size: Some(5),
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.completed, Some(true));
        let sort = filter.sort.unwrap();
        assert_eq!(sort.field, TaskSortField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(filter.limit, Some(5));
        assert_eq!(filter.offset, Some(10));
    }

    #[test]
    fn test_completed_is_true_only_for_literal_true() {
        for value in ["false", "yes", "1", "TRUE"] {
            let filter = ListTasksQuery {
                completed: Some(value.to_string()),
                ..Default::default()
            }
            .into_filter()
            .unwrap();
            assert_eq!(filter.completed, Some(false), "value {value}");
        }

        let filter = ListTasksQuery::default().into_filter().unwrap();
        assert_eq!(filter, TaskFilter::default());

        let filter = ListTasksQuery {
            completed: Some(String::new()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.completed, None);
    }

    #[test]
    fn test_unknown_sort_field_is_bad_request() {
        let result = ListTasksQuery {
            sort_by: Some("owner:asc".to_string()),
            ..Default::default()
        }
        .into_filter();

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_update_request_rejects_unknown_fields() {
        let result: Result<UpdateTaskRequest, _> =
            serde_json::from_str(r#"{"completed": true, "owner": "someone"}"#);
        assert!(result.is_err());
    }
}
