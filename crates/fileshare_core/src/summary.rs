use std::fmt;

/// Aggregate outcome of one batch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub success_count: usize,
    pub failed_count: usize,
    /// The batch went through the archive fallback instead of per-file uploads.
    pub archived: bool,
}

impl SessionSummary {
    pub fn archive(file_count: usize, accepted: bool) -> Self {
        if accepted {
            Self {
                success_count: file_count,
                failed_count: 0,
                archived: true,
            }
        } else {
            Self {
                success_count: 0,
                failed_count: file_count,
                archived: true,
            }
        }
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed_count == 0
    }

    /// The single message shown to the user when the session ends.
    pub fn notice(&self) -> Notice {
        let total = self.total();
        if self.archived {
            return if self.failed_count == 0 {
                Notice::new(
                    NoticeKind::Success,
                    format!("{total} files handed to the server for archiving"),
                )
            } else {
                Notice::new(
                    NoticeKind::Failure,
                    format!("Archive request for {total} files was rejected"),
                )
            };
        }

        match (self.success_count, self.failed_count) {
            (0, 0) => Notice::new(NoticeKind::Success, "No files to upload"),
            (n, 0) => Notice::new(
                NoticeKind::Success,
                format!("{n} file{} uploaded successfully", plural(n)),
            ),
            (0, failed) => Notice::new(
                NoticeKind::Failure,
                format!("All {failed} upload{} failed", plural(failed)),
            ),
            (ok, failed) => Notice::new(
                NoticeKind::Partial,
                format!("Uploaded {ok}/{total} files, {failed} failed"),
            ),
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Partial,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
