//! The measurement scope: configuration, activation lifecycle, and report
//! emission.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ScopeError;
use crate::probe::{ResourceProbe, ResourceSnapshot, SystemProbe};
use crate::report::Report;
use crate::sink::InfoSink;
use crate::wrap::MeasuredFn;

/// Configuration for a [`MeasurementScope`]. Immutable after construction.
///
/// No option is validated up front; an unwritable log file path surfaces as
/// an I/O error at the first report emission.
#[derive(Clone)]
pub struct ScopeConfig {
    pub(crate) enabled: bool,
    pub(crate) log_file_path: Option<PathBuf>,
    pub(crate) logger: Option<Arc<dyn InfoSink>>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file_path: None,
            logger: None,
        }
    }
}

impl ScopeConfig {
    /// Configuration with measurement enabled and no extra sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle measurement. A disabled scope bypasses snapshot capture and
    /// every sink at near-zero cost.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Append each report to this file, creating it if absent.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file_path = Some(path.into());
        self
    }

    /// Forward each report to this sink at informational severity.
    pub fn logger(mut self, sink: Arc<dyn InfoSink>) -> Self {
        self.logger = Some(sink);
        self
    }
}

impl fmt::Debug for ScopeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeConfig")
            .field("enabled", &self.enabled)
            .field("log_file_path", &self.log_file_path)
            .field("logger", &self.logger.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

/// Measures wall-clock time, peak RSS delta, and user/system CPU time
/// around a block of code.
///
/// A scope is configured once and activated any number of times. Start
/// state lives on the [`Activation`] token returned by [`enter`], never on
/// the scope itself, so concurrent activations of one shared scope are
/// independent.
///
/// [`enter`]: MeasurementScope::enter
pub struct MeasurementScope<P: ResourceProbe = SystemProbe> {
    config: ScopeConfig,
    probe: P,
}

impl MeasurementScope {
    /// Scope backed by the host platform's clock and rusage counters.
    pub fn new(config: ScopeConfig) -> Self {
        Self {
            config,
            probe: SystemProbe,
        }
    }
}

impl<P: ResourceProbe> MeasurementScope<P> {
    /// Scope backed by a custom probe. Used to substitute deterministic
    /// clocks and resource counters in tests.
    pub fn with_probe(config: ScopeConfig, probe: P) -> Self {
        Self { config, probe }
    }

    /// Whether this scope captures and reports measurements.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Begin one activation.
    ///
    /// When the scope is enabled this captures the entry snapshot; the
    /// report is emitted exactly once when the returned token is dropped or
    /// explicitly [`finish`]ed, including while a panic unwinds through it.
    /// When the scope is disabled no snapshot is taken and the token does
    /// nothing on exit.
    ///
    /// Fails only if the platform resource-usage query fails, which is
    /// fatal at first use rather than silently degraded.
    ///
    /// [`finish`]: Activation::finish
    pub fn enter(&self) -> Result<Activation<'_, P>, ScopeError> {
        let start = if self.config.enabled {
            Some(self.probe.snapshot()?)
        } else {
            None
        };
        Ok(Activation {
            scope: self,
            start,
            finished: false,
        })
    }

    /// Run `f` inside one activation and return its value unchanged.
    ///
    /// The report is emitted after `f` returns, or while a panic from `f`
    /// unwinds, before the panic reaches the caller. Emission failures on
    /// this path are logged at warn level and never alter the outcome of
    /// the measured work; use [`enter`](Self::enter) plus
    /// [`Activation::finish`] to observe them.
    pub fn measure<T>(&self, f: impl FnOnce() -> T) -> Result<T, ScopeError> {
        let activation = self.enter()?;
        let value = f();
        drop(activation);
        Ok(value)
    }

    /// Wrap a callable, selecting the passthrough or the instrumented
    /// variant once at construction time.
    ///
    /// A disabled scope yields [`MeasuredFn::Passthrough`], which invokes
    /// the original callable with no added work at all. An enabled scope
    /// yields [`MeasuredFn::Instrumented`], which creates a fresh
    /// activation per invocation.
    pub fn wrap<F>(self, f: F) -> MeasuredFn<F, P> {
        if self.config.enabled {
            MeasuredFn::Instrumented { f, scope: self }
        } else {
            MeasuredFn::Passthrough(f)
        }
    }

    /// Capture the exit snapshot, compute the report, and push it to every
    /// configured sink.
    fn complete(&self, start: &ResourceSnapshot) -> Result<Report, ScopeError> {
        let end = self.probe.snapshot()?;
        let report = Report::from_snapshots(start, &end);
        self.emit(&report)?;
        Ok(report)
    }

    /// Emission order is console, then file, then external logger. Each
    /// sink is attempted regardless of the others failing; the first error
    /// is kept and returned after all three were tried.
    fn emit(&self, report: &Report) -> Result<(), ScopeError> {
        let mut first_error = None;

        if let Err(e) = write_console(report) {
            first_error.get_or_insert(ScopeError::ConsoleWrite(e));
        }

        if let Some(path) = &self.config.log_file_path
            && let Err(e) = append_to_file(path, report)
        {
            first_error.get_or_insert(ScopeError::LogAppend {
                path: path.clone(),
                source: e,
            });
        }

        if let Some(logger) = &self.config.logger {
            logger.info(&report.to_string());
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<P: ResourceProbe + fmt::Debug> fmt::Debug for MeasurementScope<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasurementScope")
            .field("config", &self.config)
            .field("probe", &self.probe)
            .finish()
    }
}

fn write_console(report: &Report) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{report}")
}

/// The file handle lives only for the duration of one append; concurrent
/// exits each do their own open/write/close and rely on append-mode
/// atomicity for interleaving safety.
fn append_to_file(path: &Path, report: &Report) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(file, "{report}")
}

/// One entry-to-exit measurement cycle.
///
/// Holds the entry snapshot for exactly one activation. Dropping the token
/// emits the report; [`finish`](Activation::finish) does the same but
/// propagates sink errors instead of logging them.
#[must_use = "dropping the token immediately ends the activation"]
pub struct Activation<'scope, P: ResourceProbe = SystemProbe> {
    scope: &'scope MeasurementScope<P>,
    start: Option<ResourceSnapshot>,
    finished: bool,
}

impl<P: ResourceProbe> Activation<'_, P> {
    /// The monotonic timestamp captured at entry, or `None` when the scope
    /// is disabled.
    pub fn start_timestamp_ns(&self) -> Option<u64> {
        self.start.map(|s| s.timestamp_ns)
    }

    /// Complete the activation explicitly.
    ///
    /// Returns the computed report, or `Ok(None)` when the scope is
    /// disabled. All sinks are attempted before the first sink error is
    /// returned.
    pub fn finish(mut self) -> Result<Option<Report>, ScopeError> {
        self.finished = true;
        match self.start.take() {
            Some(start) => self.scope.complete(&start).map(Some),
            None => Ok(None),
        }
    }
}

impl<P: ResourceProbe> Drop for Activation<'_, P> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let Some(start) = self.start.take() else {
            return;
        };
        if let Err(e) = self.scope.complete(&start) {
            tracing::warn!(error = %e, "failed to emit measurement report");
        }
    }
}
