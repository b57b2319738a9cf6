//! Registration primitives.
//!
//! Free functions that perform one registration against an injected host
//! capability and capture the matching release as an [`Unsubscribe`] handle.
//! Registration never fails from the caller's point of view: acquisition
//! errors are reported to an [`ErrorSink`] and a no-op release is returned.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::SubscriptionError;
use crate::hosts::{EventEmitter, EventTarget, Listener, TimerHost};
use crate::release::{IntoReleases, Unsubscribe};
use crate::report::{ErrorSink, TracingErrorSink};

/// Runs `acquire` now and captures the release it returns.
///
/// If `acquire` fails (or panics), the error is reported to the default
/// tracing sink and a no-op release is substituted; the caller's flow is
/// never interrupted by a failed registration.
pub fn subscribe<F>(acquire: F) -> Unsubscribe
where
    F: FnOnce() -> Result<Unsubscribe, SubscriptionError>,
{
    subscribe_with(acquire, &TracingErrorSink::default())
}

/// [`subscribe`] with an explicit error sink.
pub fn subscribe_with<F>(acquire: F, sink: &dyn ErrorSink) -> Unsubscribe
where
    F: FnOnce() -> Result<Unsubscribe, SubscriptionError>,
{
    match catch_unwind(AssertUnwindSafe(acquire)) {
        Ok(Ok(release)) => release,
        Ok(Err(err)) => {
            sink.report("subscribe", &err);
            Unsubscribe::noop()
        }
        Err(panic) => {
            sink.report(
                "subscribe",
                &SubscriptionError::Setup(panic_message(panic.as_ref())),
            );
            Unsubscribe::noop()
        }
    }
}

/// Attaches `listener` to `emitter` under `event`.
///
/// The returned release detaches exactly that listener/event pair. No
/// deduplication: attaching the same pair twice yields two occurrences and
/// two independent releases, each removing one occurrence.
pub fn subscribe_event<A, E>(emitter: &Arc<E>, event: &str, listener: Listener<A>) -> Unsubscribe
where
    E: EventEmitter<A> + ?Sized + 'static,
    A: 'static,
{
    emitter.add_listener(event, Arc::clone(&listener));
    let emitter = Arc::clone(emitter);
    let label = format!("event:{event}");
    let event = event.to_string();
    Unsubscribe::new(move || {
        emitter.remove_listener(&event, &listener);
        Ok(())
    })
    .with_label(label)
}

/// Attaches `listener` to a DOM-style `target` under `event`.
///
/// Same contract as [`subscribe_event`] over the [`EventTarget`] surface.
pub fn subscribe_dom_event<A, T>(target: &Arc<T>, event: &str, listener: Listener<A>) -> Unsubscribe
where
    T: EventTarget<A> + ?Sized + 'static,
    A: 'static,
{
    target.add_event_listener(event, Arc::clone(&listener));
    let target = Arc::clone(target);
    let label = format!("dom-event:{event}");
    let event = event.to_string();
    Unsubscribe::new(move || {
        target.remove_event_listener(&event, &listener);
        Ok(())
    })
    .with_label(label)
}

/// Schedules `handler` to run once after `delay`, passing `args` through.
///
/// The release cancels the timer if it has not yet fired; releasing after
/// the handler ran is a no-op. `Duration::ZERO` requests next-cycle
/// execution under the host scheduler.
pub fn subscribe_timeout<H, F, A>(
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
    let id = host.set_timeout(Box::new(move || handler(args)), delay);
    let host = Arc::clone(host);
    Unsubscribe::new(move || {
        host.clear_timeout(id);
        Ok(())
    })
    .with_label(format!("timeout:{id}"))
}

/// Schedules `handler` to run every `period`, passing a fresh clone of
/// `args` each time.
///
/// The release stops future runs; a run already in progress completes.
pub fn subscribe_interval<H, F, A>(
    host: &Arc<H>,
    mut handler: F,
    period: Duration,
    args: A,
) -> Unsubscribe
where
    H: TimerHost + ?Sized + 'static,
    F: FnMut(A) + Send + 'static,
    A: Clone + Send + 'static,
{
    let id = host.set_interval(Box::new(move || handler(args.clone())), period);
    let host = Arc::clone(host);
    Unsubscribe::new(move || {
        host.clear_interval(id);
        Ok(())
    })
    .with_label(format!("interval:{id}"))
}

/// Invokes each release in sequence order, reporting failures to the
/// default tracing sink.
///
/// Accepts a single [`Unsubscribe`], a vector, or a borrowed slice. Each
/// invocation is isolated: an error or panic in one release is reported and
/// iteration continues with the next. This call itself never fails.
pub fn unsubscribe_all<R: IntoReleases>(releases: R) {
    unsubscribe_all_with(releases, &TracingErrorSink::default());
}

/// [`unsubscribe_all`] with an explicit error sink.
pub fn unsubscribe_all_with<R: IntoReleases>(releases: R, sink: &dyn ErrorSink) {
    for release in releases.into_releases() {
        let context = release.label().unwrap_or("unsubscribe").to_string();
        match catch_unwind(AssertUnwindSafe(|| release.call())) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => sink.report(&context, &err),
            Err(panic) => sink.report(
                &context,
                &SubscriptionError::ReleasePanic(panic_message(panic.as_ref())),
            ),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingErrorSink;
    use crate::testing::{ManualTimerHost, MockEmitter};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscribe_captures_release() {
        let released = Arc::new(AtomicUsize::new(0));
        let r = released.clone();
        let release = subscribe(move || {
            Ok(Unsubscribe::new(move || {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
        });

        release.call().unwrap();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_failure_yields_noop() {
        let sink = CollectingErrorSink::new();
        let release = subscribe_with(|| Err(SubscriptionError::setup("refused")), &sink);

        assert!(release.is_spent());
        release.call().unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.reports()[0].0, "subscribe");
    }

    #[test]
    fn test_subscribe_panic_yields_noop() {
        let sink = CollectingErrorSink::new();
        let release = subscribe_with(|| panic!("acquisition exploded"), &sink);

        assert!(release.is_spent());
        assert_eq!(sink.len(), 1);
        assert!(sink.reports()[0].1.contains("acquisition exploded"));
    }

    #[test]
    fn test_subscribe_event_release_detaches() {
        let emitter = Arc::new(MockEmitter::<u32>::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let s = seen.clone();
        let release = subscribe_event(
            &emitter,
            "tick",
            crate::hosts::listener(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            }),
        );

        emitter.emit("tick", &1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        release.call().unwrap();
        emitter.emit("tick", &2);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count("tick"), 0);
    }

    #[test]
    fn test_duplicate_registration_is_not_deduplicated() {
        let emitter = Arc::new(MockEmitter::<()>::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let s = seen.clone();
        let shared = crate::hosts::listener(move |()| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        let first = subscribe_event(&emitter, "tick", shared.clone());
        let _second = subscribe_event(&emitter, "tick", shared);
        assert_eq!(emitter.listener_count("tick"), 2);

        emitter.emit("tick", &());
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        // Releasing one registration removes one occurrence only.
        first.call().unwrap();
        assert_eq!(emitter.listener_count("tick"), 1);
        emitter.emit("tick", &());
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_subscribe_dom_event_release_detaches() {
        let target = Arc::new(MockEmitter::<String>::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let s = seen.clone();
        let release = subscribe_dom_event(
            &target,
            "resize",
            crate::hosts::listener(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            }),
        );

        target.emit("resize", &"800x600".to_string());
        release.call().unwrap();
        target.emit("resize", &"1024x768".to_string());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_timeout_release_before_firing_cancels() {
        let host = Arc::new(ManualTimerHost::new());
        let fired = Arc::new(AtomicUsize::new(0));

        let f = fired.clone();
        let release = subscribe_timeout(
            &host,
            move |()| {
                f.fetch_add(1, Ordering::SeqCst);
            },
            Duration::from_millis(100),
            (),
        );

        release.call().unwrap();
        host.advance(Duration::from_millis(500));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_timeout_release_after_firing_is_noop() {
        let host = Arc::new(ManualTimerHost::new());
        let fired = Arc::new(AtomicUsize::new(0));

        let f = fired.clone();
        let release = subscribe_timeout(
            &host,
            move |n: u32| {
                f.fetch_add(n as usize, Ordering::SeqCst);
            },
            Duration::from_millis(100),
            3_u32,
        );

        host.advance(Duration::from_millis(100));
        assert_eq!(fired.load(Ordering::SeqCst), 3);

        release.call().unwrap();
    }

    #[test]
    fn test_interval_release_stops_future_runs() {
        let host = Arc::new(ManualTimerHost::new());
        let ticks = Arc::new(AtomicUsize::new(0));

        let t = ticks.clone();
        let release = subscribe_interval(
            &host,
            move |()| {
                t.fetch_add(1, Ordering::SeqCst);
            },
            Duration::from_millis(100),
            (),
        );

        host.advance(Duration::from_millis(250));
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        release.call().unwrap();
        host.advance(Duration::from_millis(500));
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_all_isolates_failures() {
        let sink = CollectingErrorSink::new();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let o1 = order.clone();
        let o3 = order.clone();
        let releases = vec![
            Unsubscribe::new(move || {
                o1.lock().push("first");
                Ok(())
            }),
            Unsubscribe::new(|| Err(SubscriptionError::release("middle failed")))
                .with_label("middle"),
            Unsubscribe::new(move || {
                o3.lock().push("third");
                Ok(())
            }),
        ];

        unsubscribe_all_with(releases, &sink);

        assert_eq!(*order.lock(), vec!["first", "third"]);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.reports()[0].0, "middle");
    }

    #[test]
    fn test_unsubscribe_all_isolates_panics() {
        let sink = CollectingErrorSink::new();
        let ran = Arc::new(AtomicUsize::new(0));

        let r = ran.clone();
        let releases = vec![
            Unsubscribe::new(|| panic!("bad release")),
            Unsubscribe::new(move || {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ];

        unsubscribe_all_with(releases, &sink);

        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(sink.len(), 1);
        assert!(sink.reports()[0].1.contains("bad release"));
    }

    #[test]
    fn test_unsubscribe_all_accepts_single_release() {
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        unsubscribe_all(Unsubscribe::new(move || {
            r.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_all_leaves_borrowed_slice_usable() {
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        let releases = vec![Unsubscribe::new(move || {
            r.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })];

        unsubscribe_all(releases.as_slice());
        assert_eq!(releases.len(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        // The handles alias; a second pass over the same slice is a no-op.
        unsubscribe_all(releases.as_slice());
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
