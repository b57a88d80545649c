/// Integration tests for the enhancement poller and the task session
///
/// These run the real polling loop against an in-memory fake API with short
/// schedules, covering the timing contract (no fetch before the initial
/// delay, exactly max_attempts fetches on timeout, early stop on
/// resolution), failure swallowing, mid-poll deletion, cancellation, and
/// the session's store mutations.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskpad_client::api::TasksApi;
use taskpad_client::error::ClientError;
use taskpad_client::poller::{EnhancementPoller, PollOutcome, PollerConfig};
use taskpad_client::session::TaskSession;
use taskpad_client::store::TaskStore;
use taskpad_shared::models::task::{Task, UpdateTask};
use tokio::time::sleep;
use uuid::Uuid;

fn make_task(user_id: Uuid, title: &str) -> Task {
    Task {
        id: Uuid::new_v4(),
        user_id,
        title: title.to_string(),
        enhanced_title: None,
        completed: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Fast schedule for tests
fn test_config(max_attempts: u32) -> PollerConfig {
    PollerConfig {
        initial_delay: Duration::from_millis(80),
        interval: Duration::from_millis(40),
        max_attempts,
    }
}

/// In-memory stand-in for the Task Service API
///
/// Enhancement arrival is scripted per task id: "on the Nth list call,
/// this task's enhanced title becomes visible".
#[derive(Default)]
struct FakeApi {
    tasks: Mutex<Vec<Task>>,
    list_calls: AtomicU32,
    enhance_on_call: Mutex<HashMap<Uuid, (u32, String)>>,
    fail_lists: AtomicBool,
    updates: Mutex<Vec<(Uuid, UpdateTask)>>,
}

impl FakeApi {
    fn seed(&self, task: Task) {
        self.tasks.lock().unwrap().insert(0, task);
    }

    fn script_enhancement(&self, id: Uuid, call: u32, title: &str) {
        self.enhance_on_call
            .lock()
            .unwrap()
            .insert(id, (call, title.to_string()));
    }

    fn remove(&self, id: Uuid) {
        self.tasks.lock().unwrap().retain(|t| t.id != id);
    }

    fn list_call_count(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TasksApi for FakeApi {
    async fn list_tasks(&self, _user_id: Uuid) -> Result<Vec<Task>, ClientError> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ClientError::Api("simulated fetch failure".to_string()));
        }

        let scripts = self.enhance_on_call.lock().unwrap();
        let tasks = self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|mut task| {
                if let Some((at_call, title)) = scripts.get(&task.id) {
                    if call >= *at_call {
                        task.enhanced_title = Some(title.clone());
                    }
                }
                task
            })
            .collect();

        Ok(tasks)
    }

    async fn create_task(&self, user_id: Uuid, title: &str) -> Result<Task, ClientError> {
        let task = make_task(user_id, title);
        self.seed(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, update: UpdateTask) -> Result<Task, ClientError> {
        self.updates.lock().unwrap().push((id, update.clone()));

        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ClientError::Api("Task not found".to_string()))?;

        if let Some(title) = update.title {
            task.title = title;
            // Title edits detach a stale enhancement unless the update
            // itself carries one, mirroring the server invariant
            if update.enhanced_title.is_none() {
                task.enhanced_title = None;
            }
        }
        if let Some(enhanced) = update.enhanced_title {
            task.enhanced_title = enhanced;
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), ClientError> {
        self.remove(id);
        Ok(())
    }
}

#[tokio::test]
async fn test_no_fetch_before_initial_delay() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let task = make_task(user_id, "buy milk");
    api.seed(task.clone());

    let store = TaskStore::new();
    store.prepend(task.clone());

    let poller = EnhancementPoller::with_config(api.clone(), store.clone(), test_config(2));
    let handle = poller.spawn(task.id, user_id);

    // Halfway through the initial delay no round trip has happened yet
    sleep(Duration::from_millis(40)).await;
    assert_eq!(api.list_call_count(), 0);
    assert!(store.is_awaiting(task.id));

    handle.await.unwrap();
}

#[tokio::test]
async fn test_timeout_uses_exactly_max_attempts() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let task = make_task(user_id, "buy milk");
    api.seed(task.clone());

    let store = TaskStore::new();
    store.prepend(task.clone());

    let poller = EnhancementPoller::with_config(api.clone(), store.clone(), test_config(4));
    let outcome = poller.spawn(task.id, user_id).await.unwrap();

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(api.list_call_count(), 4);

    // Marker cleared; displayed title untouched
    assert!(!store.is_awaiting(task.id));
    let shown = store.get(task.id).unwrap();
    assert_eq!(shown.title, "buy milk");
    assert!(shown.enhanced_title.is_none());
}

#[tokio::test]
async fn test_resolves_on_first_enhanced_observation() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let task = make_task(user_id, "buy milk");
    api.seed(task.clone());
    api.script_enhancement(task.id, 2, "Buy 2L of whole milk");

    let store = TaskStore::new();
    store.prepend(task.clone());

    let poller = EnhancementPoller::with_config(api.clone(), store.clone(), test_config(5));
    let outcome = poller.spawn(task.id, user_id).await.unwrap();

    assert_eq!(outcome, PollOutcome::Resolved);
    // Stopped at the observation; no further attempts spent
    assert_eq!(api.list_call_count(), 2);

    let merged = store.get(task.id).unwrap();
    assert_eq!(merged.enhanced_title.as_deref(), Some("Buy 2L of whole milk"));
    assert!(!store.is_awaiting(task.id));
}

#[tokio::test]
async fn test_blank_enhanced_title_does_not_resolve() {
    // Whitespace-only rewrites are as useless as empty ones; neither may
    // stop the poll or replace the displayed title
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let task = make_task(user_id, "buy milk");
    api.seed(task.clone());
    api.script_enhancement(task.id, 1, "   ");

    let store = TaskStore::new();
    store.prepend(task.clone());

    let poller = EnhancementPoller::with_config(api.clone(), store.clone(), test_config(3));
    let outcome = poller.spawn(task.id, user_id).await.unwrap();

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(api.list_call_count(), 3);
}

#[tokio::test]
async fn test_failed_fetches_consume_attempts() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let task = make_task(user_id, "buy milk");
    api.seed(task.clone());
    api.fail_lists.store(true, Ordering::SeqCst);

    let store = TaskStore::new();
    store.prepend(task.clone());

    let poller = EnhancementPoller::with_config(api.clone(), store.clone(), test_config(3));
    let outcome = poller.spawn(task.id, user_id).await.unwrap();

    // Every failure is swallowed and spends one attempt; no immediate retries
    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(api.list_call_count(), 3);
    assert!(!store.is_awaiting(task.id));
}

#[tokio::test]
async fn test_task_deleted_mid_poll_times_out_harmlessly() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let task = make_task(user_id, "buy milk");
    api.seed(task.clone());

    let store = TaskStore::new();
    store.prepend(task.clone());

    let poller = EnhancementPoller::with_config(api.clone(), store.clone(), test_config(3));
    let handle = poller.spawn(task.id, user_id);

    // Delete server-side before the first fetch; every scan finds no match
    api.remove(task.id);

    let outcome = handle.await.unwrap();
    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(api.list_call_count(), 3);
}

#[tokio::test]
async fn test_cancellation_stops_poll() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let task = make_task(user_id, "buy milk");
    api.seed(task.clone());

    let store = TaskStore::new();
    let config = PollerConfig {
        initial_delay: Duration::from_secs(30),
        interval: Duration::from_secs(30),
        max_attempts: 5,
    };
    let poller = EnhancementPoller::with_config(api.clone(), store.clone(), config);
    let handle = poller.spawn(task.id, user_id);

    sleep(Duration::from_millis(20)).await;
    poller.cancel_token().cancel();

    let outcome = handle.await.unwrap();
    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(api.list_call_count(), 0);
    assert!(!store.is_awaiting(task.id));
}

#[tokio::test]
async fn test_concurrent_pollers_are_independent() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let lucky = make_task(user_id, "walk dog");
    let unlucky = make_task(user_id, "buy milk");
    api.seed(unlucky.clone());
    api.seed(lucky.clone());
    api.script_enhancement(lucky.id, 1, "Walk the dog at 6pm");

    let store = TaskStore::new();
    store.replace_all(vec![lucky.clone(), unlucky.clone()]);

    let poller = EnhancementPoller::with_config(api.clone(), store.clone(), test_config(3));
    let lucky_handle = poller.spawn(lucky.id, user_id);
    let unlucky_handle = poller.spawn(unlucky.id, user_id);

    assert_eq!(lucky_handle.await.unwrap(), PollOutcome::Resolved);
    assert_eq!(unlucky_handle.await.unwrap(), PollOutcome::TimedOut);

    assert_eq!(
        store.get(lucky.id).unwrap().enhanced_title.as_deref(),
        Some("Walk the dog at 6pm")
    );
    assert!(store.get(unlucky.id).unwrap().enhanced_title.is_none());
    assert!(store.awaiting().is_empty());
}

#[tokio::test]
async fn test_session_add_task_prepends_and_arms_poll() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let existing = make_task(user_id, "old task");
    api.seed(existing.clone());

    let session = TaskSession::with_poller_config(api.clone(), user_id, test_config(2));
    session.refresh().await.unwrap();

    let task = session.add_task("buy milk").await.unwrap();

    let tasks = session.store().tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, task.id);
    assert!(session.store().is_awaiting(task.id));

    session.shutdown();
}

#[tokio::test]
async fn test_session_rename_sends_explicit_null_and_rearms() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let mut task = make_task(user_id, "buy milk");
    task.enhanced_title = Some("Buy 2L of whole milk".to_string());
    api.seed(task.clone());

    let session = TaskSession::with_poller_config(api.clone(), user_id, test_config(2));
    session.refresh().await.unwrap();

    let renamed = session.rename_task(task.id, "buy oat milk").await.unwrap();

    // The PATCH carried a deliberate null for the stale enhancement
    let updates = api.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.enhanced_title, Some(None));
    drop(updates);

    assert_eq!(renamed.title, "buy oat milk");
    assert!(renamed.enhanced_title.is_none());
    assert!(session.store().get(task.id).unwrap().enhanced_title.is_none());
    assert!(session.store().is_awaiting(task.id));

    session.shutdown();
}

#[tokio::test]
async fn test_session_set_completed_patches_in_place() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let a = make_task(user_id, "a");
    let b = make_task(user_id, "b");
    api.seed(a.clone());
    api.seed(b.clone());

    let session = TaskSession::with_poller_config(api.clone(), user_id, test_config(2));
    session.refresh().await.unwrap();

    session.set_completed(a.id, true).await.unwrap();

    let tasks = session.store().tasks();
    assert_eq!(tasks.len(), 2);
    // Order unchanged; completion toggles never arm a poll
    assert_eq!(tasks[0].id, b.id);
    assert_eq!(tasks[1].id, a.id);
    assert!(tasks[1].completed);
    assert!(!session.store().is_awaiting(a.id));
}

#[tokio::test]
async fn test_session_delete_removes_from_store() {
    let user_id = Uuid::new_v4();
    let api = Arc::new(FakeApi::default());
    let task = make_task(user_id, "buy milk");
    api.seed(task.clone());

    let session = TaskSession::with_poller_config(api.clone(), user_id, test_config(2));
    session.refresh().await.unwrap();

    session.delete_task(task.id).await.unwrap();
    assert!(session.store().tasks().is_empty());
}
