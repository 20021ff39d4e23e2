#![deny(missing_docs)]
//! Shared logging utilities for the fileshare workspace.
//!
//! This crate provides the `share_*` logging macros used across the codebase,
//! an upload session tag scoped to the session's future and prefixed to
//! every line that future logs, and a minimal test initializer for the
//! global logger.

use std::future::Future;

#[doc(hidden)]
pub use log;

tokio::task_local! {
    /// Upload session driven by the current future.
    static SESSION: u64;
}

/// Runs `fut` with every line it logs tagged with `session`.
///
/// The tag belongs to the future, not the thread, so other futures polled
/// on the same runtime thread while `fut` is suspended stay untagged.
pub async fn in_session<F: Future>(session: u64, fut: F) -> F::Output {
    SESSION.scope(session, fut).await
}

/// Returns the session tag of the running future, or 0 outside a session.
pub fn current_session() -> u64 {
    SESSION.try_with(|id| *id).unwrap_or(0)
}

#[doc(hidden)]
pub fn session_prefix() -> String {
    match current_session() {
        0 => String::new(),
        id => format!("[session {id}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! share_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! share_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! share_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! share_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! share_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
