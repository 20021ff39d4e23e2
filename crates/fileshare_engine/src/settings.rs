use std::time::Duration;

use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:6061/api/";

/// Which transport adapter drives per-file uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// Midpoint while in flight, 100 on completion.
    Coarse,
    /// Byte-ratio progress from the request body stream.
    #[default]
    Streaming,
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Per-file budget; each upload gets `now + upload_deadline`.
    pub upload_deadline: Duration,
    /// Batches larger than this go through the archive fallback.
    pub archive_threshold: usize,
    pub progress_mode: ProgressMode,
    pub user_agent: String,
    pub concurrency_override: Option<usize>,
    /// How long a finished session stays visible before the store is cleared.
    pub summary_grace: Duration,
    pub chunk_size: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout: Duration::from_secs(10),
            upload_deadline: Duration::from_secs(60),
            archive_threshold: 500,
            progress_mode: ProgressMode::default(),
            user_agent: format!("fileshare/{}", env!("CARGO_PKG_VERSION")),
            concurrency_override: None,
            summary_grace: Duration::from_secs(3),
            chunk_size: 64 * 1024,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url")
}
