//! Clock and process resource-usage access.
//!
//! The measurement scope never talks to the platform directly; it goes
//! through the [`ResourceProbe`] capability so tests can substitute a probe
//! that returns scripted snapshots.

use std::sync::OnceLock;
use std::time::Instant;

use crate::error::ScopeError;

/// Process-wide anchor so monotonic timestamps can be expressed as integer
/// nanoseconds.
static ANCHOR: OnceLock<Instant> = OnceLock::new();

/// A point-in-time reading of the process clock and resource counters.
///
/// The timestamp and the rusage counters are captured together, as one
/// snapshot, at scope entry and again at scope exit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSnapshot {
    /// Monotonic timestamp in nanoseconds.
    pub timestamp_ns: u64,
    /// Peak resident set size in kilobytes, as reported by the platform.
    pub max_rss_kb: i64,
    /// Accumulated user-mode CPU time in seconds.
    pub user_cpu_secs: f64,
    /// Accumulated kernel-mode CPU time in seconds.
    pub system_cpu_secs: f64,
}

/// Clock plus resource-usage capability behind a measurement scope.
pub trait ResourceProbe {
    /// Capture the current timestamp and resource counters as one snapshot.
    fn snapshot(&self) -> Result<ResourceSnapshot, ScopeError>;
}

/// Default probe backed by the monotonic clock and `getrusage(RUSAGE_SELF)`.
///
/// On platforms without a process resource-usage facility every snapshot
/// fails with [`ScopeError::Unsupported`]; there is no degraded mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl ResourceProbe for SystemProbe {
    fn snapshot(&self) -> Result<ResourceSnapshot, ScopeError> {
        let timestamp_ns = monotonic_ns();
        let (max_rss_kb, user_cpu_secs, system_cpu_secs) = process_rusage()?;
        Ok(ResourceSnapshot {
            timestamp_ns,
            max_rss_kb,
            user_cpu_secs,
            system_cpu_secs,
        })
    }
}

/// Nanoseconds elapsed since the first reading taken in this process.
fn monotonic_ns() -> u64 {
    let anchor = ANCHOR.get_or_init(Instant::now);
    anchor.elapsed().as_nanos() as u64
}

#[cfg(unix)]
fn process_rusage() -> Result<(i64, f64, f64), ScopeError> {
    use libc::{RUSAGE_SELF, getrusage, rusage, timeval};

    fn seconds(tv: timeval) -> f64 {
        tv.tv_sec as f64 + tv.tv_usec as f64 / 1_000_000.0
    }

    let mut usage: rusage = unsafe { std::mem::zeroed() };
    let result = unsafe { getrusage(RUSAGE_SELF, &mut usage) };
    if result != 0 {
        return Err(ScopeError::ResourceQuery(
            std::io::Error::last_os_error().to_string(),
        ));
    }

    // ru_maxrss is kilobytes on Linux but bytes on macOS.
    #[cfg(target_os = "macos")]
    let max_rss_kb = usage.ru_maxrss / 1024;
    #[cfg(not(target_os = "macos"))]
    let max_rss_kb = usage.ru_maxrss;

    Ok((
        max_rss_kb as i64,
        seconds(usage.ru_utime),
        seconds(usage.ru_stime),
    ))
}

#[cfg(not(unix))]
fn process_rusage() -> Result<(i64, f64, f64), ScopeError> {
    Err(ScopeError::Unsupported)
}
