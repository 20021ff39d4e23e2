use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use fileshare_core::{PlatformProfile, SessionSummary, TaskId, TaskPatch, TaskStateStore, TaskStatus};
use fileshare_logging::{share_error, share_info, share_warn};
use futures_util::future::join_all;
use tokio::time::Instant;

use crate::{ArchiveRequester, StoreProgressSink, Transport, UploadFile, UploadOutcome};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Drives one batch of files through the transport in bounded windows.
pub struct UploadScheduler<'a> {
    transport: &'a dyn Transport,
    archive: &'a dyn ArchiveRequester,
    store: TaskStateStore,
    profile: PlatformProfile,
    upload_deadline: Duration,
    archive_threshold: usize,
}

impl<'a> UploadScheduler<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        archive: &'a dyn ArchiveRequester,
        store: TaskStateStore,
        profile: PlatformProfile,
    ) -> Self {
        Self {
            transport,
            archive,
            store,
            profile,
            upload_deadline: Duration::from_secs(60),
            archive_threshold: 500,
        }
    }

    pub fn with_upload_deadline(mut self, deadline: Duration) -> Self {
        self.upload_deadline = deadline;
        self
    }

    pub fn with_archive_threshold(mut self, threshold: usize) -> Self {
        self.archive_threshold = threshold;
        self
    }

    /// Uploads `files` and returns the aggregate outcome. Per-file failures
    /// are counted, never propagated.
    ///
    /// Above the archive threshold a single archive request replaces the
    /// per-file uploads and no tasks are created. Otherwise one task per file
    /// is created in submission order; windows of `concurrency_limit` tasks
    /// run one after another, each window starting all of its tasks together
    /// and waiting for every one of them to settle.
    pub async fn run(&self, files: Vec<UploadFile>) -> SessionSummary {
        let session = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        fileshare_logging::in_session(session, self.run_session(files)).await
    }

    async fn run_session(&self, files: Vec<UploadFile>) -> SessionSummary {
        let total = files.len();

        if total > self.archive_threshold {
            share_warn!(
                "{} files exceed the per-file limit of {}, requesting a server-side archive",
                total,
                self.archive_threshold
            );
            let note = format!(
                "batch of {total} files exceeds {} and should be archived on the server",
                self.archive_threshold
            );
            let accepted = self.archive.request_archive(total, &note).await;
            return SessionSummary::archive(total, accepted);
        }

        let ids = self.store.create(files.iter().map(|file| file.name.clone()));
        let queue: Vec<(TaskId, &UploadFile)> = ids.into_iter().zip(files.iter()).collect();
        let limit = self.profile.concurrency_limit();
        let delay = self.profile.inter_batch_delay();
        share_info!("uploading {} files, {} at a time", total, limit);

        let mut summary = SessionSummary::default();
        for (index, window) in queue.chunks(limit).enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcomes = join_all(window.iter().map(|(id, file)| self.run_task(*id, file))).await;
            for succeeded in outcomes {
                if succeeded {
                    summary.success_count += 1;
                } else {
                    summary.failed_count += 1;
                }
            }
        }

        share_info!(
            "session finished: {} uploaded, {} failed",
            summary.success_count,
            summary.failed_count
        );
        summary
    }

    async fn run_task(&self, id: TaskId, file: &UploadFile) -> bool {
        self.mark(id, TaskStatus::Uploading);
        let sink = StoreProgressSink::new(self.store.clone(), id);
        let deadline = Instant::now() + self.upload_deadline;

        match self.transport.upload(file, &sink, deadline).await {
            UploadOutcome::Completed => {
                self.mark(id, TaskStatus::Completed);
                share_info!("uploaded {}", file.name);
                true
            }
            UploadOutcome::Failed(kind) => {
                self.mark(id, TaskStatus::Error);
                share_warn!("upload of {} failed: {}", file.name, kind);
                false
            }
        }
    }

    fn mark(&self, id: TaskId, status: TaskStatus) {
        if let Err(err) = self.store.update(id, TaskPatch::status(status)) {
            share_error!("cannot record {:?} for task {}: {}", status, id, err);
        }
    }
}
