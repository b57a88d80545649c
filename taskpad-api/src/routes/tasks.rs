/// Task Service API
///
/// Pass-through CRUD over the tasks table. Every operation validates its
/// required fields before touching the store and responds with the uniform
/// envelope.
///
/// # Endpoints
///
/// ```text
/// GET    /api/tasks?user_id=   # List a user's tasks, newest first
/// POST   /api/tasks            # Create (title + user_id)
/// PATCH  /api/tasks            # Partial update (id + any of title/enhanced_title/completed)
/// DELETE /api/tasks?id=        # Delete by id
/// ```
///
/// # Example create request
///
/// ```json
/// { "title": "buy milk", "user_id": "550e8400-e29b-41d4-a716-446655440000" }
/// ```
///
/// The create response is the trigger point after which the client arms an
/// enhancement poll for the new task id.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskpad_shared::envelope::Envelope;
use taskpad_shared::models::task::{CreateTask, Task, UpdateTask};
use uuid::Uuid;

/// Parses a UUID field, mapping failure to a validation error
fn parse_uuid(field: &str, value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value)
        .map_err(|_| ApiError::BadRequest(format!("{} must be a valid UUID", field)))
}

/// Query parameters for listing tasks
#[derive(Debug, Deserialize)]
pub struct ListTasksParams {
    /// Owning user id
    pub user_id: Option<String>,
}

/// List tasks handler
///
/// Returns all tasks owned by the user, ordered by creation time descending.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListTasksParams>,
) -> ApiResult<Json<Envelope<Vec<Task>>>> {
    let user_id = params
        .user_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("user_id is required".to_string()))?;
    let user_id = parse_uuid("user_id", user_id)?;

    let tasks = Task::list_for_user(&state.db, user_id).await?;

    Ok(Json(Envelope::ok(tasks)))
}

/// Create task request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    /// Original title (required, non-empty after trimming)
    pub title: Option<String>,

    /// Owning user id (required)
    pub user_id: Option<String>,
}

/// Create task handler
///
/// Inserts a task with `completed = false` and no enhanced title, and
/// returns the created row with a 201 status.
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Task>>)> {
    let (title, user_id) = match (&request.title, &request.user_id) {
        (Some(title), Some(user_id)) if !title.trim().is_empty() => (title.trim(), user_id),
        _ => {
            return Err(ApiError::BadRequest(
                "title and user_id are required".to_string(),
            ))
        }
    };
    let user_id = parse_uuid("user_id", user_id)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id,
            title: title.to_string(),
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, user_id = %user_id, "Task created");

    Ok((StatusCode::CREATED, Json(Envelope::ok(task))))
}

/// Update task request
///
/// `enhanced_title` distinguishes absent from explicit null; a title edit
/// sends `"enhanced_title": null` to detach a stale enhancement (the store
/// layer also clears it whenever a title arrives on its own).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    /// Task id (required)
    pub id: Option<String>,

    /// New original title
    pub title: Option<String>,

    /// New enhanced title; explicit null clears it
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    pub enhanced_title: Option<Option<String>>,

    /// New completion flag
    pub completed: Option<bool>,
}

fn deserialize_explicit_null<'de, D>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Update task handler
///
/// Applies only the provided fields and always stamps a fresh updated
/// timestamp.
pub async fn update_task(
    State(state): State<AppState>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Envelope<Task>>> {
    let id = request
        .id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;
    let id = parse_uuid("id", id)?;

    let update = UpdateTask {
        title: request.title,
        enhanced_title: request.enhanced_title,
        completed: request.completed,
    };

    let task = Task::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(Envelope::ok(task)))
}

/// Query parameters for deleting a task
#[derive(Debug, Deserialize)]
pub struct DeleteTaskParams {
    /// Task id
    pub id: Option<String>,
}

/// Delete task handler
///
/// Validation of the id always precedes any store access; deleting an id
/// with no matching row is still a success from the caller's perspective.
pub async fn delete_task(
    State(state): State<AppState>,
    Query(params): Query<DeleteTaskParams>,
) -> ApiResult<Json<Envelope<()>>> {
    let id = params
        .id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;
    let id = parse_uuid("id", id)?;

    let removed = Task::delete(&state.db, id).await?;

    tracing::info!(task_id = %id, removed, "Task deleted");

    Ok(Json(Envelope::ok_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        let err = parse_uuid("user_id", "not-a-uuid").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_update_request_explicit_null() {
        let request: UpdateTaskRequest = serde_json::from_str(
            r#"{"id": "550e8400-e29b-41d4-a716-446655440000", "title": "walk dog", "enhanced_title": null}"#,
        )
        .unwrap();
        assert_eq!(request.enhanced_title, Some(None));
        assert_eq!(request.title.as_deref(), Some("walk dog"));
    }

    #[test]
    fn test_update_request_absent_enhanced_title() {
        let request: UpdateTaskRequest = serde_json::from_str(
            r#"{"id": "550e8400-e29b-41d4-a716-446655440000", "completed": true}"#,
        )
        .unwrap();
        assert!(request.enhanced_title.is_none());
    }
}
