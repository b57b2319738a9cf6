//! Error types for subscription registration and release.

use thiserror::Error;

/// The error type for subscription operations.
///
/// None of the registration or bulk-release operations propagate this to the
/// caller; failures are handed to the configured [`ErrorSink`] and execution
/// continues. It surfaces directly only when a caller invokes a single
/// [`Unsubscribe`] handle by hand.
///
/// [`ErrorSink`]: crate::report::ErrorSink
/// [`Unsubscribe`]: crate::release::Unsubscribe
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The acquisition procedure failed before a release could be captured.
    #[error("subscription setup failed: {0}")]
    Setup(String),

    /// A release procedure failed while tearing down its resource.
    #[error("release failed: {0}")]
    Release(String),

    /// A release procedure panicked while tearing down its resource.
    #[error("release panicked: {0}")]
    ReleasePanic(String),

    /// Any other failure surfaced by a caller-supplied callback.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SubscriptionError {
    /// Creates a setup error from a message.
    #[must_use]
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup(message.into())
    }

    /// Creates a release error from a message.
    #[must_use]
    pub fn release(message: impl Into<String>) -> Self {
        Self::Release(message.into())
    }
}
