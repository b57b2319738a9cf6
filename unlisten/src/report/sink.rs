//! Error sink trait and implementations.

use parking_lot::RwLock;
use tracing::{debug, warn, Level};

use crate::errors::SubscriptionError;

/// Trait for sinks that receive errors swallowed during registration and
/// release.
///
/// Implementations must never fail or panic; a sink that misbehaves during
/// teardown would defeat the point of error isolation.
pub trait ErrorSink: Send + Sync {
    /// Reports one caught error.
    ///
    /// # Arguments
    ///
    /// * `context` - Where the error was caught (e.g., a release label)
    /// * `error` - The caught error
    fn report(&self, context: &str, error: &SubscriptionError);
}

/// A sink that discards all reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpErrorSink;

impl ErrorSink for NoOpErrorSink {
    fn report(&self, _context: &str, _error: &SubscriptionError) {
        // Intentionally empty - discards all reports
    }
}

/// The default sink: logs reports through the tracing framework.
#[derive(Debug, Clone)]
pub struct TracingErrorSink {
    /// The log level to use.
    level: Level,
}

impl Default for TracingErrorSink {
    fn default() -> Self {
        Self { level: Level::WARN }
    }
}

impl TracingErrorSink {
    /// Creates a new tracing sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level tracing sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl ErrorSink for TracingErrorSink {
    fn report(&self, context: &str, error: &SubscriptionError) {
        match self.level {
            Level::DEBUG => {
                debug!(context = %context, error = %error, "subscription error swallowed");
            }
            _ => {
                warn!(context = %context, error = %error, "subscription error swallowed");
            }
        }
    }
}

/// A collecting sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingErrorSink {
    reports: RwLock<Vec<(String, String)>>,
}

impl CollectingErrorSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected `(context, error message)` pairs.
    #[must_use]
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.read().clone()
    }

    /// Returns the number of collected reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    /// Returns true if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    /// Clears all collected reports.
    pub fn clear(&self) {
        self.reports.write().clear();
    }
}

impl ErrorSink for CollectingErrorSink {
    fn report(&self, context: &str, error: &SubscriptionError) {
        self.reports
            .write()
            .push((context.to_string(), error.to_string()));
    }
}
