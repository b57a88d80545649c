/// Task session
///
/// Ties the API client, the Client State Store, and the Enhancement Poller
/// into the operations a UI layer calls. The session owns the store for one
/// user; mutations apply the server's response to the store directly, and
/// the two title-producing operations (create, rename) additionally arm a
/// fire-and-forget enhancement poll that never blocks the caller.
///
/// # Example
///
/// ```no_run
/// use taskpad_client::api::ApiClient;
/// use taskpad_client::session::TaskSession;
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> anyhow::Result<()> {
/// let api = Arc::new(ApiClient::new("http://localhost:8080"));
/// let session = TaskSession::new(api, user_id);
///
/// session.refresh().await?;
/// let task = session.add_task("buy milk").await?;
/// session.set_completed(task.id, true).await?;
/// session.shutdown();
/// # Ok(())
/// # }
/// ```

use crate::api::TasksApi;
use crate::error::ClientError;
use crate::poller::{EnhancementPoller, PollerConfig};
use crate::store::TaskStore;
use std::sync::Arc;
use taskpad_shared::models::task::{Task, UpdateTask};
use uuid::Uuid;

/// One user's client session: store + poller over a `TasksApi`
pub struct TaskSession {
    api: Arc<dyn TasksApi>,
    store: TaskStore,
    poller: EnhancementPoller,
    user_id: Uuid,
}

impl TaskSession {
    /// Creates a session with the default polling schedule
    pub fn new(api: Arc<dyn TasksApi>, user_id: Uuid) -> Self {
        Self::with_poller_config(api, user_id, PollerConfig::default())
    }

    /// Creates a session with a custom polling schedule
    pub fn with_poller_config(
        api: Arc<dyn TasksApi>,
        user_id: Uuid,
        config: PollerConfig,
    ) -> Self {
        let store = TaskStore::new();
        let poller = EnhancementPoller::with_config(Arc::clone(&api), store.clone(), config);
        TaskSession {
            api,
            store,
            poller,
            user_id,
        }
    }

    /// The session's store, for rendering
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Refetches the full task list into the store
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let tasks = self.api.list_tasks(self.user_id).await?;
        self.store.replace_all(tasks);
        Ok(())
    }

    /// Creates a task, prepends it, and arms an enhancement poll
    pub async fn add_task(&self, title: &str) -> Result<Task, ClientError> {
        let task = self.api.create_task(self.user_id, title).await?;
        self.store.prepend(task.clone());
        self.poller.spawn(task.id, self.user_id);
        Ok(task)
    }

    /// Edits a task's title
    ///
    /// The PATCH carries an explicit null enhanced title so the stale
    /// enhancement is detached in the same update, then a fresh poll is
    /// armed for the rewritten title.
    pub async fn rename_task(&self, id: Uuid, title: &str) -> Result<Task, ClientError> {
        let task = self
            .api
            .update_task(
                id,
                UpdateTask {
                    title: Some(title.to_string()),
                    enhanced_title: Some(None),
                    completed: None,
                },
            )
            .await?;
        self.store.patch(task.clone());
        self.poller.spawn(task.id, self.user_id);
        Ok(task)
    }

    /// Sets a task's completion flag
    pub async fn set_completed(&self, id: Uuid, completed: bool) -> Result<Task, ClientError> {
        let task = self
            .api
            .update_task(
                id,
                UpdateTask {
                    completed: Some(completed),
                    ..Default::default()
                },
            )
            .await?;
        self.store.patch(task.clone());
        Ok(task)
    }

    /// Deletes a task and removes it from the store
    ///
    /// A poll already in flight for the id finds no match on its next fetch
    /// and runs out its budget harmlessly.
    pub async fn delete_task(&self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete_task(id).await?;
        self.store.remove(id);
        Ok(())
    }

    /// Cancels every in-flight enhancement poll (clean shutdown)
    pub fn shutdown(&self) {
        self.poller.cancel_token().cancel();
    }
}
