use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use fileshare_engine::ClientSettings;
use fileshare_logging::{share_info, share_warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::ProgressChoice;

pub const CONFIG_FILENAME: &str = "fileshare.ron";

/// Optional overrides read from the settings file. Absent fields keep the
/// engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub upload_deadline_secs: Option<u64>,
    pub archive_threshold: Option<usize>,
    pub progress: Option<ProgressChoice>,
    pub concurrency: Option<usize>,
    pub user_agent: Option<String>,
    pub summary_grace_ms: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

/// Overrides given on the command line; these win over the file.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub server: Option<String>,
    pub progress: Option<ProgressChoice>,
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: ClientSettings,
    pub download_dir: PathBuf,
}

/// Reads the settings file. A missing file is normal; an unreadable or
/// malformed one is reported and ignored.
pub fn load_file_config(path: &Path) -> FileConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return FileConfig::default();
        }
        Err(err) => {
            share_warn!("Failed to read settings from {:?}: {}", path, err);
            return FileConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            share_info!("Loaded settings from {:?}", path);
            config
        }
        Err(err) => {
            share_warn!("Failed to parse settings from {:?}: {}", path, err);
            FileConfig::default()
        }
    }
}

pub fn resolve(file: FileConfig, flags: FlagOverrides) -> anyhow::Result<Resolved> {
    let mut settings = ClientSettings::default();

    if let Some(server) = flags.server.or(file.server) {
        settings.base_url = parse_base_url(&server)?;
    }
    if let Some(secs) = file.connect_timeout_secs {
        settings.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.upload_deadline_secs {
        settings.upload_deadline = Duration::from_secs(secs);
    }
    if let Some(threshold) = file.archive_threshold {
        settings.archive_threshold = threshold;
    }
    if let Some(progress) = flags.progress.or(file.progress) {
        settings.progress_mode = progress.into();
    }
    if let Some(user_agent) = file.user_agent {
        settings.user_agent = user_agent;
    }
    if let Some(ms) = file.summary_grace_ms {
        settings.summary_grace = Duration::from_millis(ms);
    }
    settings.concurrency_override = file.concurrency;

    Ok(Resolved {
        settings,
        download_dir: file.download_dir.unwrap_or_else(|| PathBuf::from(".")),
    })
}

/// Endpoints are joined onto the base, so it must end with a slash.
fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid server url {raw:?}"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("server url {raw:?} cannot carry a path");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
