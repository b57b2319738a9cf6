//! Collector for bulk release of subscriptions.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::SubscriptionError;
use crate::hosts::{EventEmitter, EventTarget, Listener, TimerHost};
use crate::release::Unsubscribe;
use crate::report::{ErrorSink, TracingErrorSink};
use crate::subscribe;

/// Tracks release handles in registration order and releases them all with
/// one call.
///
/// Each method mirrors a registration primitive from [`subscribe`], appends
/// the produced [`Unsubscribe`] to the internal sequence, and returns that
/// same handle, so individual release stays available alongside collective
/// release.
///
/// The collector is a cheap cloneable handle; clones share one sequence.
///
/// [`subscribe`]: crate::subscribe
#[derive(Clone)]
pub struct SubscriptionCollector {
    inner: Arc<CollectorInner>,
}

struct CollectorInner {
    releases: RwLock<Vec<Unsubscribe>>,
    sink: Arc<dyn ErrorSink>,
}

impl Default for SubscriptionCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionCollector {
    /// Creates an empty collector reporting to the default tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingErrorSink::default()))
    }

    /// Creates an empty collector with an explicit error sink.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn ErrorSink>) -> Self {
        Self::with_sink_and_releases(sink, Vec::new())
    }

    /// Creates a collector pre-seeded with externally created releases.
    ///
    /// Seeded releases run first during bulk release, before anything
    /// registered through the collector.
    #[must_use]
    pub fn with_releases(releases: Vec<Unsubscribe>) -> Self {
        Self::with_sink_and_releases(Arc::new(TracingErrorSink::default()), releases)
    }

    /// Creates a pre-seeded collector with an explicit error sink.
    #[must_use]
    pub fn with_sink_and_releases(sink: Arc<dyn ErrorSink>, releases: Vec<Unsubscribe>) -> Self {
        Self {
            inner: Arc::new(CollectorInner {
                releases: RwLock::new(releases),
                sink,
            }),
        }
    }

    fn push(&self, release: Unsubscribe) -> Unsubscribe {
        self.inner.releases.write().push(release.clone());
        release
    }

    /// Runs `acquire` now, tracks the captured release, and returns it.
    ///
    /// Acquisition failures go to the collector's sink; a no-op release is
    /// tracked and returned in their place.
    pub fn subscribe<F>(&self, acquire: F) -> Unsubscribe
    where
        F: FnOnce() -> Result<Unsubscribe, SubscriptionError>,
    {
        self.push(subscribe::subscribe_with(acquire, self.inner.sink.as_ref()))
    }

    /// Attaches `listener` to `emitter` under `event` and tracks the release.
    pub fn subscribe_event<A, E>(
        &self,
        emitter: &Arc<E>,
        event: &str,
        listener: Listener<A>,
    ) -> Unsubscribe
    where
        E: EventEmitter<A> + ?Sized + 'static,
        A: 'static,
    {
        self.push(subscribe::subscribe_event(emitter, event, listener))
    }

    /// Attaches `listener` to a DOM-style `target` and tracks the release.
    pub fn subscribe_dom_event<A, T>(
        &self,
        target: &Arc<T>,
        event: &str,
        listener: Listener<A>,
    ) -> Unsubscribe
    where
        T: EventTarget<A> + ?Sized + 'static,
        A: 'static,
    {
        self.push(subscribe::subscribe_dom_event(target, event, listener))
    }

    /// Schedules a one-shot timer and tracks its cancellation.
    pub fn subscribe_timeout<H, F, A>(
        &self,
        host: &Arc<H>,
        handler: F,
        delay: Duration,
        args: A,
    ) -> Unsubscribe
    where
        H: TimerHost + ?Sized + 'static,
        F: FnOnce(A) + Send + 'static,
        A: Send + 'static,
    {
        self.push(subscribe::subscribe_timeout(host, handler, delay, args))
    }

    /// Schedules a repeating timer and tracks its cancellation.
    pub fn subscribe_interval<H, F, A>(
        &self,
        host: &Arc<H>,
        handler: F,
        period: Duration,
        args: A,
    ) -> Unsubscribe
    where
        H: TimerHost + ?Sized + 'static,
        F: FnMut(A) + Send + 'static,
        A: Clone + Send + 'static,
    {
        self.push(subscribe::subscribe_interval(host, handler, period, args))
    }

    /// Merges an externally created release into the sequence.
    pub fn track(&self, release: Unsubscribe) -> Unsubscribe {
        self.push(release)
    }

    /// Releases everything tracked, in registration order, then empties the
    /// sequence.
    ///
    /// Per-entry error isolation as in [`unsubscribe_all`]: a failing
    /// release is reported to the collector's sink and the rest still run.
    /// Calling this on an empty collector, or twice in a row, is a no-op.
    ///
    /// [`unsubscribe_all`]: crate::subscribe::unsubscribe_all
    pub fn unsubscribe_all(&self) {
        let releases = {
            let mut releases = self.inner.releases.write();
            std::mem::take(&mut *releases)
        };

        if releases.is_empty() {
            return;
        }

        subscribe::unsubscribe_all_with(releases, self.inner.sink.as_ref());
    }

    /// Returns a bound closure performing exactly [`unsubscribe_all`].
    ///
    /// Lets callers hand off teardown without exposing the collector
    /// itself.
    ///
    /// [`unsubscribe_all`]: SubscriptionCollector::unsubscribe_all
    #[must_use]
    pub fn cleanup_fn(&self) -> impl Fn() + Send + Sync + 'static {
        let collector = self.clone();
        move || collector.unsubscribe_all()
    }

    /// Returns the number of tracked releases.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.releases.read().len()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.releases.read().is_empty()
    }
}

impl std::fmt::Debug for SubscriptionCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionCollector")
            .field("pending", &self.pending())
            .finish()
    }
}
