use thiserror::Error;

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Uploading,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }

    /// Legal moves are `Pending -> Uploading -> {Completed, Error}`. Staying in
    /// the same non-terminal state is allowed so progress-only patches can
    /// restate the status.
    fn can_move_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Uploading)
                | (Uploading, Uploading)
                | (Uploading, Completed)
                | (Uploading, Error)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub progress: u8,
}

impl UploadTask {
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: TaskStatus::Pending,
            progress: 0,
        }
    }

    /// Applies a patch to a copy of this record, enforcing the lifecycle and
    /// progress invariants. On error `self` is unchanged.
    pub(crate) fn patched(&self, patch: TaskPatch) -> Result<UploadTask, TaskUpdateError> {
        let mut next = self.clone();

        if let Some(status) = patch.status {
            if !self.status.can_move_to(status) {
                return Err(TaskUpdateError::IllegalTransition {
                    id: self.id,
                    from: self.status,
                    to: status,
                });
            }
            next.status = status;
        }

        match next.status {
            TaskStatus::Completed => next.progress = 100,
            TaskStatus::Error => {}
            TaskStatus::Pending => {}
            TaskStatus::Uploading => {
                if let Some(progress) = patch.progress {
                    // 100 is reserved for Completed.
                    let capped = progress.min(99);
                    next.progress = next.progress.max(capped);
                }
            }
        }

        Ok(next)
    }
}

/// Partial update for one task; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            progress: None,
        }
    }

    pub fn progress(percent: u8) -> Self {
        Self {
            status: None,
            progress: Some(percent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskUpdateError {
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
    #[error("task {id} cannot move from {from:?} to {to:?}")]
    IllegalTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },
}
