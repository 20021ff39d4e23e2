use std::collections::BTreeMap;
use std::sync::{mpsc, Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{TaskId, TaskPatch, TaskStatus, TaskUpdateError, UploadTask};

/// Change notification delivered to store subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Created(Vec<UploadTask>),
    Updated(UploadTask),
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub pending: usize,
    pub uploading: usize,
    pub completed: usize,
    pub failed: usize,
}

impl TaskCounts {
    pub fn total(&self) -> usize {
        self.pending + self.uploading + self.completed + self.failed
    }

    pub fn is_settled(&self) -> bool {
        self.pending == 0 && self.uploading == 0
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: TaskId,
    tasks: BTreeMap<TaskId, UploadTask>,
    subscribers: Vec<mpsc::Sender<StoreEvent>>,
}

impl Inner {
    fn notify(&mut self, event: StoreEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

/// Shared per-task status/progress records for batch sessions.
///
/// Cloning yields another handle to the same records. Every write replaces a
/// whole record under the lock, so a concurrent `snapshot` never observes a
/// half-applied update.
#[derive(Debug, Clone, Default)]
pub struct TaskStateStore {
    inner: Arc<RwLock<Inner>>,
}

impl TaskStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates one `Pending` task per name, in order. Ids keep increasing
    /// across sessions and survive `clear`.
    pub fn create<I, S>(&self, names: I) -> Vec<TaskId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inner = self.write();
        let mut created = Vec::new();
        for name in names {
            inner.next_id += 1;
            let task = UploadTask::new(inner.next_id, name);
            inner.tasks.insert(task.id, task.clone());
            created.push(task);
        }
        let ids = created.iter().map(|task| task.id).collect();
        if !created.is_empty() {
            inner.notify(StoreEvent::Created(created));
        }
        ids
    }

    /// Applies `patch` to task `id` and returns the resulting record.
    pub fn update(&self, id: TaskId, patch: TaskPatch) -> Result<UploadTask, TaskUpdateError> {
        let mut inner = self.write();
        let current = inner
            .tasks
            .get(&id)
            .ok_or(TaskUpdateError::UnknownTask(id))?;
        let next = current.patched(patch)?;
        if &next != current {
            inner.tasks.insert(id, next.clone());
            inner.notify(StoreEvent::Updated(next.clone()));
        }
        Ok(next)
    }

    pub fn get(&self, id: TaskId) -> Option<UploadTask> {
        self.read().tasks.get(&id).cloned()
    }

    /// All tasks in id (submission) order.
    pub fn snapshot(&self) -> Vec<UploadTask> {
        self.read().tasks.values().cloned().collect()
    }

    pub fn counts(&self) -> TaskCounts {
        let inner = self.read();
        let mut counts = TaskCounts::default();
        for task in inner.tasks.values() {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Uploading => counts.uploading += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Error => counts.failed += 1,
            }
        }
        counts
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        if inner.tasks.is_empty() {
            return;
        }
        inner.tasks.clear();
        inner.notify(StoreEvent::Cleared);
    }

    /// Registers an observer. Dropping the receiver unsubscribes it on the
    /// next change.
    pub fn subscribe(&self) -> mpsc::Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.write().subscribers.push(tx);
        rx
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
