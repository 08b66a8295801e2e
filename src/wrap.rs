//! Wrapping callables in a measurement scope.

use crate::probe::{ResourceProbe, SystemProbe};
use crate::scope::MeasurementScope;

/// A callable that may be instrumented by a measurement scope.
///
/// The variant is chosen once, when [`MeasurementScope::wrap`] consumes the
/// scope: disabled scopes produce [`Passthrough`], enabled scopes produce
/// [`Instrumented`]. A passthrough never touches the clock or the resource
/// counters.
///
/// Every instrumented invocation runs inside its own activation token, so a
/// wrapper shared across threads measures each call independently.
///
/// [`Passthrough`]: MeasuredFn::Passthrough
/// [`Instrumented`]: MeasuredFn::Instrumented
pub enum MeasuredFn<F, P: ResourceProbe = SystemProbe> {
    /// The original callable, invoked with no added work.
    Passthrough(F),
    /// The callable plus the scope that measures each invocation.
    Instrumented {
        /// The wrapped callable.
        f: F,
        /// The configured scope, moved out of [`MeasurementScope::wrap`].
        scope: MeasurementScope<P>,
    },
}

impl<F, P: ResourceProbe> MeasuredFn<F, P> {
    /// Whether invocations run unmeasured.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, MeasuredFn::Passthrough(_))
    }

    /// Invoke a zero-argument callable, returning its value verbatim.
    ///
    /// Panics from the callable propagate unchanged, after the report for
    /// the in-flight activation has been emitted.
    pub fn call<T>(&self) -> T
    where
        F: Fn() -> T,
    {
        match self {
            MeasuredFn::Passthrough(f) => f(),
            MeasuredFn::Instrumented { f, scope } => invoke(scope, f),
        }
    }

    /// Invoke a single-argument callable, forwarding `arg` verbatim.
    pub fn call_with<A, T>(&self, arg: A) -> T
    where
        F: Fn(A) -> T,
    {
        match self {
            MeasuredFn::Passthrough(f) => f(arg),
            MeasuredFn::Instrumented { f, scope } => invoke(scope, || f(arg)),
        }
    }
}

fn invoke<P: ResourceProbe, T>(scope: &MeasurementScope<P>, f: impl FnOnce() -> T) -> T {
    match scope.enter() {
        Ok(activation) => {
            // The token drops after `f`, emitting the report even when `f`
            // panics.
            let value = f();
            drop(activation);
            value
        }
        Err(e) => {
            tracing::warn!(error = %e, "entry snapshot failed, invoking unmeasured");
            f()
        }
    }
}
