use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

const STAGING_PREFIX: &str = ".fileshare-";
const STAGING_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot use download directory {path:?}: {reason}")]
    OutputDir { path: PathBuf, reason: String },
    #[error("cannot save {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates `dir` and any missing parents. Fails if something other than a
/// directory already sits at that path.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let output_dir_error = |reason: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        reason,
    };
    fs::create_dir_all(dir).map_err(|err| output_dir_error(err.to_string()))?;
    if !dir.is_dir() {
        return Err(output_dir_error("not a directory".to_string()));
    }
    Ok(())
}

/// Saves downloads into one directory.
///
/// Each file is staged next to its target and renamed over it, so the target
/// holds either its previous complete contents or the new ones, never a mix
/// and never nothing.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Blocking; call it off the async runtime for large payloads.
    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let io_error = |source: io::Error| PersistError::Io {
            path: target.clone(),
            source,
        };

        let mut staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(io_error)?;
        staged.write_all(content).map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;

        // rename(2) replaces an existing file in place. On failure the staged
        // file is dropped with the error and removed.
        staged.persist(&target).map_err(|err| io_error(err.error))?;
        Ok(target)
    }
}
