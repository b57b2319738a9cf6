//! Mock hosts for testing.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::hosts::{same_listener, EventEmitter, EventTarget, Listener, TimerHost, TimerId};

/// An in-process emitter recording attached listeners.
///
/// Implements both the emitter-style and the DOM-style capability over one
/// listener table, so a single double covers [`subscribe_event`] and
/// [`subscribe_dom_event`] tests.
///
/// [`subscribe_event`]: crate::subscribe::subscribe_event
/// [`subscribe_dom_event`]: crate::subscribe::subscribe_dom_event
pub struct MockEmitter<A> {
    listeners: Mutex<Vec<(String, Listener<A>)>>,
}

impl<A> Default for MockEmitter<A> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<A> MockEmitter<A> {
    /// Creates a new mock emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to every listener attached under `event`.
    ///
    /// Listeners run outside the internal lock, so they may attach or
    /// detach reentrantly; such mutations take effect from the next emit.
    pub fn emit(&self, event: &str, payload: &A) {
        let snapshot: Vec<Listener<A>> = self
            .listeners
            .lock()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener(payload);
        }
    }

    /// Returns the number of listeners attached under `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Returns the total number of attached listeners.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.listeners.lock().len()
    }

    fn attach(&self, event: &str, listener: Listener<A>) {
        self.listeners.lock().push((event.to_string(), listener));
    }

    fn detach(&self, event: &str, listener: &Listener<A>) {
        let mut listeners = self.listeners.lock();
        // Remove one occurrence only; duplicate registrations stay attached.
        if let Some(index) = listeners
            .iter()
            .position(|(name, l)| name == event && same_listener(l, listener))
        {
            listeners.remove(index);
        }
    }
}

impl<A: 'static> EventEmitter<A> for MockEmitter<A> {
    fn add_listener(&self, event: &str, listener: Listener<A>) {
        self.attach(event, listener);
    }

    fn remove_listener(&self, event: &str, listener: &Listener<A>) {
        self.detach(event, listener);
    }
}

impl<A: 'static> EventTarget<A> for MockEmitter<A> {
    fn add_event_listener(&self, event: &str, listener: Listener<A>) {
        self.attach(event, listener);
    }

    fn remove_event_listener(&self, event: &str, listener: &Listener<A>) {
        self.detach(event, listener);
    }
}

impl<A> std::fmt::Debug for MockEmitter<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmitter")
            .field("total_listeners", &self.total_listeners())
            .finish()
    }
}

enum TimerCallback {
    Once(Option<Box<dyn FnOnce() + Send>>),
    Repeating(Option<Box<dyn FnMut() + Send>>),
}

struct TimerEntry {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    callback: TimerCallback,
}

impl TimerEntry {
    fn armed(&self) -> bool {
        match &self.callback {
            TimerCallback::Once(slot) => slot.is_some(),
            TimerCallback::Repeating(slot) => slot.is_some(),
        }
    }
}

struct HostState {
    now: Duration,
    timers: Vec<TimerEntry>,
}

enum Fired {
    Once(Box<dyn FnOnce() + Send>),
    Repeating(TimerId, Box<dyn FnMut() + Send>),
}

/// A [`TimerHost`] driven by a virtual clock.
///
/// Nothing fires until [`advance`] is called; due timers then fire in due
/// order (ties broken by scheduling order), with repeating timers firing
/// once per elapsed period. Callbacks run outside the internal lock and may
/// schedule or cancel timers reentrantly.
///
/// [`advance`]: ManualTimerHost::advance
pub struct ManualTimerHost {
    state: Mutex<HostState>,
    next_id: AtomicU64,
}

impl Default for ManualTimerHost {
    fn default() -> Self {
        Self {
            state: Mutex::new(HostState {
                now: Duration::ZERO,
                timers: Vec::new(),
            }),
            next_id: AtomicU64::new(0),
        }
    }
}

impl ManualTimerHost {
    /// Creates a new manual timer host at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Returns the number of scheduled timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.state.lock().timers.len()
    }

    /// Moves the virtual clock forward, firing everything that comes due.
    ///
    /// `Duration::ZERO` still fires timers scheduled with a zero delay,
    /// matching next-cycle semantics.
    pub fn advance(&self, delta: Duration) {
        let target = self.state.lock().now + delta;
        loop {
            match self.take_next_due(target) {
                None => break,
                Some(Fired::Once(callback)) => callback(),
                Some(Fired::Repeating(id, mut callback)) => {
                    callback();
                    self.rearm(id, callback);
                }
            }
        }
    }

    fn schedule(&self, callback: TimerCallback, delay: Duration, period: Option<Duration>) -> TimerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock();
        let due = state.now + delay;
        state.timers.push(TimerEntry {
            id,
            due,
            period,
            callback,
        });
        id
    }

    fn remove(&self, id: TimerId) {
        let mut state = self.state.lock();
        state.timers.retain(|entry| entry.id != id);
    }

    fn take_next_due(&self, target: Duration) -> Option<Fired> {
        let mut state = self.state.lock();
        let index = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= target && entry.armed())
            .min_by_key(|&(_, entry)| (entry.due, entry.id))
            .map(|(index, _)| index);

        let Some(index) = index else {
            state.now = target;
            return None;
        };

        state.now = state.now.max(state.timers[index].due);

        if let Some(period) = state.timers[index].period {
            // A zero period would never make progress on a virtual clock.
            state.timers[index].due += period.max(Duration::from_nanos(1));
            let id = state.timers[index].id;
            if let TimerCallback::Repeating(slot) = &mut state.timers[index].callback {
                return slot.take().map(|callback| Fired::Repeating(id, callback));
            }
            None
        } else {
            let entry = state.timers.remove(index);
            match entry.callback {
                TimerCallback::Once(slot) => slot.map(Fired::Once),
                TimerCallback::Repeating(_) => None,
            }
        }
    }

    fn rearm(&self, id: TimerId, callback: Box<dyn FnMut() + Send>) {
        let mut state = self.state.lock();
        // The callback may have cancelled its own timer while firing; the
        // entry is gone in that case and the callback is dropped with it.
        if let Some(entry) = state.timers.iter_mut().find(|entry| entry.id == id) {
            entry.callback = TimerCallback::Repeating(Some(callback));
        }
    }
}

impl TimerHost for ManualTimerHost {
    fn set_timeout(&self, handler: Box<dyn FnOnce() + Send>, delay: Duration) -> TimerId {
        self.schedule(TimerCallback::Once(Some(handler)), delay, None)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.remove(id);
    }

    fn set_interval(&self, handler: Box<dyn FnMut() + Send>, period: Duration) -> TimerId {
        self.schedule(TimerCallback::Repeating(Some(handler)), period, Some(period))
    }

    fn clear_interval(&self, id: TimerId) {
        self.remove(id);
    }
}

impl std::fmt::Debug for ManualTimerHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTimerHost")
            .field("now", &self.now())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}
