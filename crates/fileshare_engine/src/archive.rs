use fileshare_logging::{share_info, share_warn};

use crate::FileStoreClient;

/// Single "pack these files server-side" request used when a batch is too
/// large for per-file uploads. There is no partial success: the job is
/// either accepted or the whole batch counts as failed.
#[async_trait::async_trait]
pub trait ArchiveRequester: Send + Sync {
    async fn request_archive(&self, file_count: usize, note: &str) -> bool;
}

#[async_trait::async_trait]
impl ArchiveRequester for FileStoreClient {
    async fn request_archive(&self, file_count: usize, note: &str) -> bool {
        match self.archive_request(file_count, note).await {
            Ok(()) => {
                share_info!("archive request for {} files accepted", file_count);
                true
            }
            Err(err) => {
                share_warn!("archive request for {} files failed: {}", file_count, err);
                false
            }
        }
    }
}
