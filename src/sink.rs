//! External logger capability.

/// A caller-supplied sink that records report text at informational
/// severity.
///
/// The scope treats this purely as an opaque collaborator; `Send + Sync` is
/// required so one configured scope can be shared across threads.
pub trait InfoSink: Send + Sync {
    /// Record one message at informational severity.
    fn info(&self, message: &str);
}

/// Stock sink that forwards reports to the active `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl InfoSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }
}
