//! The release handle produced by every registration.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::errors::SubscriptionError;

type ReleaseFn = Box<dyn FnOnce() -> Result<(), SubscriptionError> + Send>;

/// A handle that reverses the effect of one registration.
///
/// Handles are cheap to clone; every clone aliases the same underlying
/// release callback. The callback runs at most once: the first [`call`]
/// through any clone consumes it, and later calls are safe no-ops. This is
/// what lets a [`SubscriptionCollector`] track a release while also handing
/// the same release back to the caller.
///
/// [`call`]: Unsubscribe::call
/// [`SubscriptionCollector`]: crate::collector::SubscriptionCollector
#[derive(Clone)]
pub struct Unsubscribe {
    inner: Arc<Mutex<Option<ReleaseFn>>>,
    label: Option<Arc<str>>,
}

impl Unsubscribe {
    /// Wraps a release callback.
    #[must_use]
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() -> Result<(), SubscriptionError> + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Some(Box::new(release)))),
            label: None,
        }
    }

    /// A release that does nothing.
    ///
    /// Substituted when an acquisition procedure fails, so the caller's flow
    /// is never interrupted by a failed registration.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
            label: None,
        }
    }

    /// Attaches a label used as context when failures are reported.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(Arc::from(label.into()));
        self
    }

    /// Returns the label, if one was attached.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns true once the release callback has run (or never existed).
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.inner.lock().is_none()
    }

    /// Invokes the release callback.
    ///
    /// The first call through any clone runs the callback and returns its
    /// result; every later call returns `Ok(())` without side effects.
    pub fn call(&self) -> Result<(), SubscriptionError> {
        // Take while holding the lock, run after releasing it, so a release
        // callback may itself touch collectors and hosts without deadlock.
        let release = self.inner.lock().take();
        match release {
            Some(release) => release(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("label", &self.label)
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Conversion into an ordered sequence of releases.
///
/// Lets [`unsubscribe_all`] accept a single handle, an owned vector, or a
/// borrowed slice (handles are clones, so borrowing does not disturb the
/// caller's sequence).
///
/// [`unsubscribe_all`]: crate::subscribe::unsubscribe_all
pub trait IntoReleases {
    /// Converts self into releases in invocation order.
    fn into_releases(self) -> Vec<Unsubscribe>;
}

impl IntoReleases for Unsubscribe {
    fn into_releases(self) -> Vec<Unsubscribe> {
        vec![self]
    }
}

impl IntoReleases for Vec<Unsubscribe> {
    fn into_releases(self) -> Vec<Unsubscribe> {
        self
    }
}

impl IntoReleases for &[Unsubscribe] {
    fn into_releases(self) -> Vec<Unsubscribe> {
        self.to_vec()
    }
}

impl<const N: usize> IntoReleases for [Unsubscribe; N] {
    fn into_releases(self) -> Vec<Unsubscribe> {
        self.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_call_runs_release_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let release = Unsubscribe::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(!release.is_spent());
        release.call().unwrap();
        assert!(release.is_spent());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_second_call_is_noop() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let release = Unsubscribe::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        release.call().unwrap();
        release.call().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clones_alias_one_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let release = Unsubscribe::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let alias = release.clone();

        release.call().unwrap();
        alias.call().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(alias.is_spent());
    }

    #[test]
    fn test_noop_is_spent_and_silent() {
        let release = Unsubscribe::noop();
        assert!(release.is_spent());
        release.call().unwrap();
    }

    #[test]
    fn test_label() {
        let release = Unsubscribe::new(|| Ok(())).with_label("timer:42");
        assert_eq!(release.label(), Some("timer:42"));
    }

    #[test]
    fn test_into_releases_single_and_slice() {
        let a = Unsubscribe::noop();
        assert_eq!(a.clone().into_releases().len(), 1);

        let seq = vec![Unsubscribe::noop(), Unsubscribe::noop()];
        assert_eq!(seq.as_slice().into_releases().len(), 2);
        assert_eq!(seq.into_releases().len(), 2);
    }
}
