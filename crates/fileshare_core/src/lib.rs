//! Fileshare core: pure upload-session state, platform profiles and selection.
mod profile;
mod selection;
mod store;
mod summary;
mod task;

pub use profile::{
    detect, EnvironmentSignals, PlatformProfile, CONSTRAINED_INTER_BATCH_DELAY,
    DEFAULT_CONCURRENCY_LIMIT,
};
pub use selection::SelectionSet;
pub use store::{StoreEvent, TaskCounts, TaskStateStore};
pub use summary::{Notice, NoticeKind, SessionSummary};
pub use task::{TaskId, TaskPatch, TaskStatus, TaskUpdateError, UploadTask};
