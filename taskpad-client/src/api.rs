/// HTTP API client and the `TasksApi` seam
///
/// `TasksApi` is the trait the store-reconciliation machinery (the session
/// and the enhancement poller) is written against; `ApiClient` is its
/// reqwest-backed production implementation. Tests substitute an in-memory
/// fake behind the same trait.
///
/// All responses arrive in the uniform `{success, data?, error?}` envelope;
/// a `success: false` envelope surfaces as `ClientError::Api` carrying the
/// server's error message.
///
/// # Example
///
/// ```no_run
/// use taskpad_client::api::{ApiClient, TasksApi};
///
/// # async fn example() -> anyhow::Result<()> {
/// let api = ApiClient::new("http://localhost:8080");
/// let user = api.get_or_create_user("user@example.com", Some("Jane"), None).await?;
/// let tasks = api.list_tasks(user.id).await?;
/// println!("{} tasks", tasks.len());
/// # Ok(())
/// # }
/// ```

use crate::error::ClientError;
use async_trait::async_trait;
use serde::Serialize;
use taskpad_shared::envelope::Envelope;
use taskpad_shared::models::task::{Task, UpdateTask};
use taskpad_shared::models::user::User;
use uuid::Uuid;

/// Client-side view of the Task Service API
///
/// The poller only needs `list_tasks`; the session uses the full surface.
#[async_trait]
pub trait TasksApi: Send + Sync {
    /// Fetches the complete task list for a user, newest first
    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>, ClientError>;

    /// Creates a task; the returned row is unenhanced and incomplete
    async fn create_task(&self, user_id: Uuid, title: &str) -> Result<Task, ClientError>;

    /// Partially updates a task
    async fn update_task(&self, id: Uuid, update: UpdateTask) -> Result<Task, ClientError>;

    /// Deletes a task by id
    async fn delete_task(&self, id: Uuid) -> Result<(), ClientError>;
}

/// reqwest-backed API client
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct CreateTaskBody<'a> {
    title: &'a str,
    user_id: Uuid,
}

#[derive(Serialize)]
struct UpdateTaskBody<'a> {
    id: Uuid,
    #[serde(flatten)]
    update: &'a UpdateTask,
}

#[derive(Serialize)]
struct GetOrCreateUserBody<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Serialize)]
struct LinkPhoneBody<'a> {
    id: Uuid,
    phone: &'a str,
}

impl ApiClient {
    /// Creates a client against a server base URL (no trailing slash needed)
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Looks up the user by email, creating the account on first sight
    pub async fn get_or_create_user(
        &self,
        email: &str,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<User, ClientError> {
        let envelope: Envelope<User> = self
            .http
            .post(self.url("/api/users"))
            .json(&GetOrCreateUserBody { email, name, phone })
            .send()
            .await?
            .json()
            .await?;

        envelope.into_data().map_err(ClientError::Api)
    }

    /// Links a phone number to the account (webhook phone resolution
    /// depends on this)
    pub async fn link_phone(&self, id: Uuid, phone: &str) -> Result<User, ClientError> {
        let envelope: Envelope<User> = self
            .http
            .patch(self.url("/api/users"))
            .json(&LinkPhoneBody { id, phone })
            .send()
            .await?
            .json()
            .await?;

        envelope.into_data().map_err(ClientError::Api)
    }
}

#[async_trait]
impl TasksApi for ApiClient {
    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>, ClientError> {
        let envelope: Envelope<Vec<Task>> = self
            .http
            .get(self.url("/api/tasks"))
            .query(&[("user_id", user_id.to_string())])
            .send()
            .await?
            .json()
            .await?;

        envelope.into_data().map_err(ClientError::Api)
    }

    async fn create_task(&self, user_id: Uuid, title: &str) -> Result<Task, ClientError> {
        let envelope: Envelope<Task> = self
            .http
            .post(self.url("/api/tasks"))
            .json(&CreateTaskBody { title, user_id })
            .send()
            .await?
            .json()
            .await?;

        envelope.into_data().map_err(ClientError::Api)
    }

    async fn update_task(&self, id: Uuid, update: UpdateTask) -> Result<Task, ClientError> {
        let envelope: Envelope<Task> = self
            .http
            .patch(self.url("/api/tasks"))
            .json(&UpdateTaskBody {
                id,
                update: &update,
            })
            .send()
            .await?
            .json()
            .await?;

        envelope.into_data().map_err(ClientError::Api)
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), ClientError> {
        let envelope: Envelope<serde_json::Value> = self
            .http
            .delete(self.url("/api/tasks"))
            .query(&[("id", id.to_string())])
            .send()
            .await?
            .json()
            .await?;

        if envelope.success {
            Ok(())
        } else {
            Err(ClientError::Api(envelope.error.unwrap_or_else(|| {
                "delete failed without an error message".to_string()
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ApiClient::new("http://localhost:8080/");
        assert_eq!(api.url("/api/tasks"), "http://localhost:8080/api/tasks");
    }

    #[test]
    fn test_update_body_carries_explicit_null() {
        let update = UpdateTask {
            title: Some("walk dog".to_string()),
            enhanced_title: Some(None),
            completed: None,
        };
        let body = UpdateTaskBody {
            id: Uuid::nil(),
            update: &update,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["title"], "walk dog");
        assert!(json["enhanced_title"].is_null());
        assert!(json.get("completed").is_none());
    }
}
