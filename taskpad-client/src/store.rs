/// Client State Store
///
/// Holds the ordered task list for the current user plus the set of task ids
/// currently awaiting an enhancement (the in-flight marker). This is the
/// single source of truth for rendering; direct CRUD calls and the
/// enhancement poller both mutate it.
///
/// Mutation rules:
/// - create prepends
/// - patch/merge replaces the matching entry by id in place, leaving list
///   order unchanged
/// - delete removes by id
/// - merges key strictly on id equality, so no entry is ever duplicated
///
/// Every mutation happens under a write lock, so a concurrent reader
/// observes either the prior state or the fully applied change, never a
/// partial write. The store is cheap to clone and shares its contents; its
/// lifetime is scoped to the active user session.
///
/// # Example
///
/// ```
/// use taskpad_client::store::TaskStore;
///
/// let store = TaskStore::new();
/// assert!(store.tasks().is_empty());
/// ```

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use taskpad_shared::models::task::Task;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    /// Ordered task list, newest first
    tasks: Vec<Task>,

    /// Task ids currently awaiting an enhancement; never persisted
    awaiting: HashSet<Uuid>,
}

/// Shared, session-scoped task list with the in-flight marker set
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    inner: Arc<RwLock<Inner>>,
}

impl TaskStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("task store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("task store lock poisoned")
    }

    /// Replaces the entire list (full refetch)
    pub fn replace_all(&self, tasks: Vec<Task>) {
        self.write().tasks = tasks;
    }

    /// Prepends a newly created task
    pub fn prepend(&self, task: Task) {
        self.write().tasks.insert(0, task);
    }

    /// Replaces the entry with a matching id in place
    ///
    /// Returns false (and changes nothing) when no entry matches, e.g. when
    /// a merge races a local delete.
    pub fn patch(&self, task: Task) -> bool {
        let mut inner = self.write();
        match inner.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Removes the entry with a matching id
    pub fn remove(&self, id: Uuid) {
        self.write().tasks.retain(|t| t.id != id);
    }

    /// Marks a task id as awaiting enhancement
    pub fn mark_awaiting(&self, id: Uuid) {
        self.write().awaiting.insert(id);
    }

    /// Clears the awaiting marker for a task id
    pub fn clear_awaiting(&self, id: Uuid) {
        self.write().awaiting.remove(&id);
    }

    /// Whether a task id is currently awaiting enhancement
    pub fn is_awaiting(&self, id: Uuid) -> bool {
        self.read().awaiting.contains(&id)
    }

    /// Snapshot of the current task list
    pub fn tasks(&self) -> Vec<Task> {
        self.read().tasks.clone()
    }

    /// Snapshot of the ids currently awaiting enhancement
    pub fn awaiting(&self) -> HashSet<Uuid> {
        self.read().awaiting.clone()
    }

    /// Finds a task by id
    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.read().tasks.iter().find(|t| t.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(title: &str) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            enhanced_title: None,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prepend_puts_newest_first() {
        let store = TaskStore::new();
        let a = task("a");
        let b = task("b");
        store.prepend(a.clone());
        store.prepend(b.clone());

        let titles: Vec<_> = store.tasks().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[test]
    fn test_patch_replaces_in_place_without_reordering() {
        let store = TaskStore::new();
        let a = task("a");
        let b = task("b");
        let c = task("c");
        store.replace_all(vec![c.clone(), b.clone(), a.clone()]);

        let mut enhanced = b.clone();
        enhanced.enhanced_title = Some("Do the B thing".to_string());
        assert!(store.patch(enhanced));

        let tasks = store.tasks();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].id, c.id);
        assert_eq!(tasks[1].id, b.id);
        assert_eq!(
            tasks[1].enhanced_title.as_deref(),
            Some("Do the B thing")
        );
        assert_eq!(tasks[2].id, a.id);
    }

    #[test]
    fn test_patch_unknown_id_is_noop() {
        let store = TaskStore::new();
        store.prepend(task("a"));
        assert!(!store.patch(task("ghost")));
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_patch_never_duplicates() {
        let store = TaskStore::new();
        let a = task("a");
        store.prepend(a.clone());

        let mut updated = a.clone();
        updated.completed = true;
        store.patch(updated);

        assert_eq!(store.tasks().len(), 1);
        assert!(store.tasks()[0].completed);
    }

    #[test]
    fn test_remove_by_id() {
        let store = TaskStore::new();
        let a = task("a");
        let b = task("b");
        store.replace_all(vec![b.clone(), a.clone()]);

        store.remove(a.id);
        let tasks = store.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, b.id);
    }

    #[test]
    fn test_awaiting_markers() {
        let store = TaskStore::new();
        let id = Uuid::new_v4();

        assert!(!store.is_awaiting(id));
        store.mark_awaiting(id);
        assert!(store.is_awaiting(id));
        store.clear_awaiting(id);
        assert!(!store.is_awaiting(id));
    }
}
