//! # Perfscope
//!
//! Measures wall-clock execution time, peak resident-memory delta, and
//! user/system CPU time around a demarcated block of code or a wrapped
//! callable, then reports the results to standard output, an optional
//! append-mode log file, and an optional external logging sink.
//!
//! A [`MeasurementScope`] is configured once and can then be activated any
//! number of times. Each activation owns its own start state, so one
//! configured scope can be shared across threads without measurements
//! interfering with each other.
//!
//! ```
//! use perfscope::{MeasurementScope, ScopeConfig};
//!
//! let scope = MeasurementScope::new(ScopeConfig::new());
//! let total = scope.measure(|| (1..=100).sum::<u64>())?;
//! assert_eq!(total, 5050);
//! # Ok::<(), perfscope::ScopeError>(())
//! ```

pub mod error;
pub mod probe;
pub mod report;
pub mod scope;
pub mod sink;
pub mod wrap;

pub use error::ScopeError;
pub use probe::{ResourceProbe, ResourceSnapshot, SystemProbe};
pub use report::Report;
pub use scope::{Activation, MeasurementScope, ScopeConfig};
pub use sink::{InfoSink, TracingSink};
pub use wrap::MeasuredFn;
