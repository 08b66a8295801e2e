//! Error types for snapshot capture and report emission.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while capturing resource usage or emitting a report.
///
/// Emission errors are best-effort telemetry failures: they are surfaced to
/// callers who ask for them via [`crate::scope::Activation::finish`], but
/// they never alter the outcome of the measured work itself.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// Writing the report to standard output failed.
    #[error("failed to write report to stdout: {0}")]
    ConsoleWrite(#[source] io::Error),

    /// Appending the report to the configured log file failed.
    #[error("failed to append report to {}: {source}", path.display())]
    LogAppend {
        /// The configured log file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Querying process resource usage from the platform failed.
    #[error("resource usage query failed: {0}")]
    ResourceQuery(String),

    /// The current platform exposes no process resource-usage facility.
    #[error("resource usage tracking is not supported on this platform")]
    Unsupported,
}
