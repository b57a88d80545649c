/// Enhancement Poller
///
/// After a task is created or its title edited, an external AI process may
/// attach an enhanced (rewritten) title out of band. Nothing pushes that
/// event to the client; instead a per-task poll re-fetches the user's task
/// list on a fixed schedule until the enhancement appears or the attempt
/// budget runs out, then merges the result into the Client State Store.
///
/// # State Machine
///
/// ```text
/// idle → awaiting → resolved     (enhanced title observed, merged)
///                 → timed-out    (attempt budget exhausted)
///                 → cancelled    (shutdown token fired)
/// ```
///
/// # Schedule
///
/// One initial delay before the first fetch (gives the external process
/// time to react, avoiding a wasted immediate round trip), then up to
/// `max_attempts` fetches spaced by a fixed interval. A failed fetch is
/// swallowed and consumes its attempt; retrying immediately would only
/// amplify request volume on a struggling network.
///
/// Each spawned poll is independent: pollers for different task ids share
/// nothing but the store, and a task deleted mid-poll simply never matches
/// until the budget runs out.
///
/// # Example
///
/// ```no_run
/// use taskpad_client::api::ApiClient;
/// use taskpad_client::poller::EnhancementPoller;
/// use taskpad_client::store::TaskStore;
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// # async fn example() {
/// let api = Arc::new(ApiClient::new("http://localhost:8080"));
/// let store = TaskStore::new();
/// let poller = EnhancementPoller::new(api, store);
///
/// // Fire and forget after a create call returns
/// let handle = poller.spawn(Uuid::new_v4(), Uuid::new_v4());
/// # let _ = handle;
/// # }
/// ```

use crate::api::TasksApi;
use crate::store::TaskStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Default delay before the first fetch (3 seconds)
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(3);

/// Default spacing between fetches (3 seconds)
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Default attempt budget
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Polling schedule configuration
///
/// Interval and attempt count trade perceived latency against request
/// volume; the default 3s x 5 schedule covers about fifteen seconds of
/// waiting, which comfortably bounds a typical rewrite round trip.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay before the first fetch
    pub initial_delay: Duration,

    /// Spacing between fetches
    pub interval: Duration,

    /// Maximum number of fetches before giving up
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            initial_delay: DEFAULT_INITIAL_DELAY,
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Terminal state of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Enhanced title observed and merged into the store
    Resolved,

    /// Attempt budget exhausted without an enhancement; the original title
    /// stays displayed and a later external write is not surfaced without a
    /// manual refresh
    TimedOut,

    /// Shutdown token fired before resolution
    Cancelled,
}

/// Spawns and tracks per-task enhancement polls
///
/// Cloneable handle; all clones share the cancellation token, so cancelling
/// one shuts down every in-flight poll (used for clean shutdown and in
/// tests; the product itself never cancels).
#[derive(Clone)]
pub struct EnhancementPoller {
    source: Arc<dyn TasksApi>,
    store: TaskStore,
    config: PollerConfig,
    cancel: CancellationToken,
}

impl EnhancementPoller {
    /// Creates a poller with the default 3s x 5 schedule
    pub fn new(source: Arc<dyn TasksApi>, store: TaskStore) -> Self {
        Self::with_config(source, store, PollerConfig::default())
    }

    /// Creates a poller with a custom schedule
    pub fn with_config(source: Arc<dyn TasksApi>, store: TaskStore, config: PollerConfig) -> Self {
        EnhancementPoller {
            source,
            store,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token cancelling every poll spawned from this poller
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Arms a poll for one task
    ///
    /// Marks the id as awaiting immediately (so the UI can show the pending
    /// state) and spawns an independent polling loop. The caller is never
    /// blocked; the returned handle can be awaited in tests or dropped.
    pub fn spawn(&self, task_id: Uuid, user_id: Uuid) -> JoinHandle<PollOutcome> {
        self.store.mark_awaiting(task_id);

        let source = Arc::clone(&self.source);
        let store = self.store.clone();
        let config = self.config.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let outcome = poll_for_enhancement(&*source, &store, &config, &cancel, task_id, user_id)
                .await;
            store.clear_awaiting(task_id);
            outcome
        })
    }
}

/// Runs one poll loop to a terminal state
///
/// The awaiting marker is cleared by the caller on every exit path.
async fn poll_for_enhancement(
    source: &dyn TasksApi,
    store: &TaskStore,
    config: &PollerConfig,
    cancel: &CancellationToken,
    task_id: Uuid,
    user_id: Uuid,
) -> PollOutcome {
    tokio::select! {
        _ = cancel.cancelled() => return PollOutcome::Cancelled,
        _ = sleep(config.initial_delay) => {}
    }

    for attempt in 1..=config.max_attempts {
        match source.list_tasks(user_id).await {
            Ok(tasks) => {
                if let Some(task) = tasks.into_iter().find(|t| t.id == task_id) {
                    if task.has_enhancement() {
                        tracing::debug!(
                            %task_id,
                            attempt,
                            "Enhanced title observed, merging into store"
                        );
                        store.patch(task);
                        return PollOutcome::Resolved;
                    }
                }
                // Task absent (deleted mid-poll) or not yet enhanced; keep going
            }
            Err(err) => {
                // Transient failures are expected and non-fatal; the attempt
                // is spent rather than retried immediately
                tracing::debug!(%task_id, attempt, error = %err, "Poll fetch failed");
            }
        }

        if attempt < config.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                _ = sleep(config.interval) => {}
            }
        }
    }

    tracing::debug!(
        %task_id,
        max_attempts = config.max_attempts,
        "Enhancement poll exhausted its attempt budget"
    );
    PollOutcome::TimedOut
}
