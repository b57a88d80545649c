/// Task model and database operations
///
/// Tasks are the core entity of Taskpad. Each task belongs to a single user
/// and carries two titles: the original free-text title the user typed, and
/// an optional enhanced title written out-of-band by an external AI process.
///
/// The enhanced title is presumed derived from the current original title.
/// Editing the original title therefore clears any stale enhancement in the
/// same UPDATE, so a reader never sees an enhancement describing a different
/// sentence.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     enhanced_title TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::task::{Task, CreateTask, UpdateTask};
/// use taskpad_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     user_id: Uuid::new_v4(),
///     title: "buy milk".to_string(),
/// }).await?;
///
/// // Toggle completion; other fields untouched
/// let task = Task::update(&pool, task.id, UpdateTask {
///     completed: Some(true),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task model representing a to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Original title as typed by the user
    pub title: String,

    /// AI-rewritten title, attached asynchronously
    ///
    /// Cleared whenever the original title is edited
    pub enhanced_title: Option<String>,

    /// Completion flag
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last mutated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether a usable enhanced title is attached (non-null and non-blank)
    pub fn has_enhancement(&self) -> bool {
        self.enhanced_title
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Input for creating a new task
///
/// New tasks always start with `completed = false` and no enhanced title,
/// regardless of input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning user
    pub user_id: Uuid,

    /// Original title (required, non-empty after trimming)
    pub title: String,
}

/// Input for partially updating a task
///
/// Omitted fields are untouched. `enhanced_title` distinguishes an absent
/// field from an explicit null: `Some(None)` deliberately clears a stale
/// enhancement, which is how title edits detach an enhancement that no
/// longer describes the title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New original title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New enhanced title; `Some(None)` clears it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_explicit_null"
    )]
    pub enhanced_title: Option<Option<String>>,

    /// New completion flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Maps a present-but-null JSON field to `Some(None)`, leaving an absent
/// field as `None` via `#[serde(default)]`
fn deserialize_explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl Task {
    /// Creates a new task
    ///
    /// The row starts incomplete and unenhanced; the caller is expected to
    /// arm an enhancement poll once the create call returns.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title)
            VALUES ($1, $2)
            RETURNING id, user_id, title, enhanced_title, completed, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, enhanced_title, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks owned by a user, most recently created first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, enhanced_title, completed, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Partially updates a task, stamping `updated_at`
    ///
    /// Only the provided fields are applied. Invariant: a title edit that
    /// does not itself carry an enhanced title clears any existing one, so a
    /// stale enhancement never survives a title change.
    ///
    /// # Returns
    ///
    /// The updated task, or None if no row matches the ID
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        update: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let enhanced_provided = update.enhanced_title.is_some();
        let enhanced_value = update.enhanced_title.flatten();

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                enhanced_title = CASE
                    WHEN $3 THEN $4
                    WHEN $2 IS NOT NULL THEN NULL
                    ELSE enhanced_title
                END,
                completed = COALESCE($5, completed),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, enhanced_title, completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.title)
        .bind(enhanced_provided)
        .bind(enhanced_value)
        .bind(update.completed)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// # Returns
    ///
    /// The number of rows removed (0 if the task did not exist)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(enhanced: Option<&str>) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "buy milk".to_string(),
            enhanced_title: enhanced.map(str::to_string),
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_enhancement() {
        assert!(!sample_task(None).has_enhancement());
        assert!(!sample_task(Some("")).has_enhancement());
        assert!(!sample_task(Some("   ")).has_enhancement());
        assert!(sample_task(Some("Buy 2L of whole milk")).has_enhancement());
    }

    #[test]
    fn test_update_task_absent_enhanced_title() {
        let update: UpdateTask = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert!(update.enhanced_title.is_none());
        assert_eq!(update.completed, Some(true));
    }

    #[test]
    fn test_update_task_explicit_null_enhanced_title() {
        // The title-edit payload: new title plus a deliberate null
        let update: UpdateTask =
            serde_json::from_str(r#"{"title": "walk dog", "enhanced_title": null}"#).unwrap();
        assert_eq!(update.title.as_deref(), Some("walk dog"));
        assert_eq!(update.enhanced_title, Some(None));
    }

    #[test]
    fn test_update_task_set_enhanced_title() {
        let update: UpdateTask =
            serde_json::from_str(r#"{"enhanced_title": "Walk the dog at 6pm"}"#).unwrap();
        assert_eq!(
            update.enhanced_title,
            Some(Some("Walk the dog at 6pm".to_string()))
        );
    }

    #[test]
    fn test_update_task_serializes_explicit_null() {
        let update = UpdateTask {
            title: Some("walk dog".to_string()),
            enhanced_title: Some(None),
            completed: None,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"title":"walk dog","enhanced_title":null}"#);
    }

    #[test]
    fn test_update_task_default_is_empty_patch() {
        let json = serde_json::to_string(&UpdateTask::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
