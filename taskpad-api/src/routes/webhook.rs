/// Webhook Ingestion API
///
/// A single endpoint accepting an action-tagged payload from an external
/// automation workflow (e.g. a messaging-channel bot). Actions delegate to
/// the same task operations as the Task Service API; the only addition is
/// user resolution by email or phone.
///
/// # Authentication
///
/// If `WEBHOOK_SECRET` is configured, the `x-webhook-secret` header must
/// match exactly; otherwise the check is skipped (open for self-hosted
/// setups).
///
/// # Actions
///
/// - `create_task`: title + (user_email or user_phone); phone lookup first,
///   email get-or-create as fallback, phone-only miss is a 404
/// - `list_tasks`: user_email; an unseen email lists as zero tasks
/// - `complete_task`: task_id (+ completed, default true)
/// - `update_enhanced_title`: task_id + non-empty enhanced_title — the
///   external AI writer's path, and the event the client poller awaits
///
/// # Example payload
///
/// ```json
/// {
///   "action": "create_task",
///   "user_phone": "+1 (555) 123-4567",
///   "title": "buy milk"
/// }
/// ```

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskpad_shared::envelope::Envelope;
use taskpad_shared::models::task::{CreateTask, Task, UpdateTask};
use taskpad_shared::models::user::User;
use uuid::Uuid;

/// Header carrying the shared secret
const SECRET_HEADER: &str = "x-webhook-secret";

/// Incoming webhook payload
///
/// Flat shape with an action discriminant; which of the optional fields are
/// required depends on the action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Action discriminant
    pub action: Option<String>,

    /// User email for resolution
    pub user_email: Option<String>,

    /// User phone for resolution (any formatting; matched digits-only)
    pub user_phone: Option<String>,

    /// Target task id
    pub task_id: Option<Uuid>,

    /// Task title (create_task)
    pub title: Option<String>,

    /// Enhanced title (update_enhanced_title)
    pub enhanced_title: Option<String>,

    /// Completion flag (complete_task; defaults to true)
    pub completed: Option<bool>,
}

/// Webhook status response for connectivity testing
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookStatus {
    /// Always "ok"
    pub status: String,

    /// Human-readable note
    pub message: String,
}

/// No-op GET handler for connectivity testing
pub async fn webhook_status() -> Json<WebhookStatus> {
    Json(WebhookStatus {
        status: "ok".to_string(),
        message: "Webhook endpoint is active".to_string(),
    })
}

/// Webhook ingestion handler
///
/// Verifies the shared secret (when configured), then dispatches on the
/// action discriminant.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.webhook_secret() {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            return Err(ApiError::Unauthorized("Unauthorized".to_string()));
        }
    }

    match payload.action.as_deref() {
        Some("create_task") => create_task(&state, payload).await,
        Some("list_tasks") => list_tasks(&state, payload).await,
        Some("complete_task") => complete_task(&state, payload).await,
        Some("update_enhanced_title") => update_enhanced_title(&state, payload).await,
        other => Err(ApiError::BadRequest(format!(
            "Invalid action: {}",
            other.unwrap_or("<missing>")
        ))),
    }
}

/// Resolves the owning user for a create_task action
///
/// Resolution order: a provided phone is normalized and looked up first; on
/// a miss (or no phone at all), a provided email falls back to get-or-create.
/// A phone with no match and no email fallback is a 404 rather than an
/// implicit account creation from an unverified number.
async fn resolve_user(
    state: &AppState,
    user_email: Option<&str>,
    user_phone: Option<&str>,
) -> Result<User, ApiError> {
    if let Some(phone) = user_phone {
        if let Some(user) = User::find_by_phone(&state.db, phone).await? {
            return Ok(user);
        }
    }

    if let Some(email) = user_email {
        let (user, created) = User::get_or_create(&state.db, email, None, user_phone).await?;
        if created {
            tracing::info!(user_id = %user.id, "User created via webhook");
        }
        return Ok(user);
    }

    Err(ApiError::NotFound(
        "No user with that phone number; link a phone number to your account first".to_string(),
    ))
}

async fn create_task(state: &AppState, payload: WebhookPayload) -> Result<Response, ApiError> {
    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (Some(title), true) = (
        title,
        payload.user_email.is_some() || payload.user_phone.is_some(),
    ) else {
        return Err(ApiError::BadRequest(
            "title and user_email or user_phone are required".to_string(),
        ));
    };

    let user = resolve_user(
        state,
        payload.user_email.as_deref(),
        payload.user_phone.as_deref(),
    )
    .await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: user.id,
            title: title.to_string(),
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, user_id = %user.id, "Task created via webhook");

    Ok((StatusCode::CREATED, Json(Envelope::ok(task))).into_response())
}

async fn list_tasks(state: &AppState, payload: WebhookPayload) -> Result<Response, ApiError> {
    let email = payload
        .user_email
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("user_email is required".to_string()))?;

    // An unseen email lists as having zero tasks rather than failing
    let tasks = match User::find_by_email(&state.db, email).await? {
        Some(user) => Task::list_for_user(&state.db, user.id).await?,
        None => Vec::new(),
    };

    Ok(Json(Envelope::ok(tasks)).into_response())
}

async fn complete_task(state: &AppState, payload: WebhookPayload) -> Result<Response, ApiError> {
    let task_id = payload
        .task_id
        .ok_or_else(|| ApiError::BadRequest("task_id is required".to_string()))?;

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            completed: Some(payload.completed.unwrap_or(true)),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(Envelope::ok(task)).into_response())
}

async fn update_enhanced_title(
    state: &AppState,
    payload: WebhookPayload,
) -> Result<Response, ApiError> {
    let task_id = payload.task_id;
    let enhanced = payload
        .enhanced_title
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (Some(task_id), Some(enhanced)) = (task_id, enhanced) else {
        return Err(ApiError::BadRequest(
            "task_id and enhanced_title are required".to_string(),
        ));
    };

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            enhanced_title: Some(Some(enhanced.to_string())),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id = %task.id, "Enhanced title attached");

    Ok(Json(Envelope::ok(task)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_deserializes_with_missing_action() {
        let payload: WebhookPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.action.is_none());
    }

    #[test]
    fn test_payload_create_task_shape() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "action": "create_task",
            "user_phone": "+1 (555) 123-4567",
            "title": "buy milk"
        }))
        .unwrap();
        assert_eq!(payload.action.as_deref(), Some("create_task"));
        assert_eq!(payload.user_phone.as_deref(), Some("+1 (555) 123-4567"));
        assert!(payload.task_id.is_none());
    }
}
