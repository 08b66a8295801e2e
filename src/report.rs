//! Report computation and the fixed four-line text format.

use std::fmt;

use crate::probe::ResourceSnapshot;

/// The measured deltas for one completed activation.
///
/// The `Display` impl renders the report in its wire format: four labeled
/// lines separated by `\n`, with no trailing newline. Sinks add their own
/// terminator when writing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    /// Wall-clock duration of the activation in seconds.
    pub execution_time_secs: f64,
    /// Change in peak resident set size in megabytes. May be negative when
    /// the process peak was already higher before entry.
    pub memory_delta_mb: f64,
    /// User-mode CPU time consumed during the activation, in seconds.
    pub user_cpu_secs: f64,
    /// Kernel-mode CPU time consumed during the activation, in seconds.
    pub system_cpu_secs: f64,
}

impl Report {
    /// Compute the deltas between the entry and exit snapshots.
    pub fn from_snapshots(start: &ResourceSnapshot, end: &ResourceSnapshot) -> Self {
        Self {
            execution_time_secs: end.timestamp_ns.saturating_sub(start.timestamp_ns) as f64
                / 1_000_000_000.0,
            memory_delta_mb: (end.max_rss_kb - start.max_rss_kb) as f64 / 1024.0,
            user_cpu_secs: end.user_cpu_secs - start.user_cpu_secs,
            system_cpu_secs: end.system_cpu_secs - start.system_cpu_secs,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Execution Time: {:.6} sec\n\
             Memory Usage: {:.2} MB\n\
             User CPU Time: {:.6} sec\n\
             System CPU Time: {:.6} sec",
            self.execution_time_secs, self.memory_delta_mb, self.user_cpu_secs, self.system_cpu_secs
        )
    }
}
