//! Listener attach/detach capabilities.

use std::sync::Arc;

/// A shared event listener.
///
/// The payload type `A` is the listener's argument tuple, carried through
/// registration and removal without erasure. Listener identity is `Arc`
/// pointer identity: clones of the same `Listener` compare equal, two
/// listeners built from identical closures do not. This mirrors
/// reference-identity semantics in listener registries.
pub type Listener<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Wraps a closure as a shareable [`Listener`].
pub fn listener<A, F>(f: F) -> Listener<A>
where
    F: Fn(&A) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Returns true if both handles refer to the same listener.
#[must_use]
pub fn same_listener<A: ?Sized>(a: &Listener<A>, b: &Listener<A>) -> bool {
    // Compare data pointers only; comparing fat pointers would also compare
    // vtable addresses, which are not stable across codegen units.
    std::ptr::eq(
        Arc::as_ptr(a).cast::<u8>(),
        Arc::as_ptr(b).cast::<u8>(),
    )
}

/// Capability of emitter-style objects: `addListener` / `removeListener`.
///
/// Attaching the same listener twice produces two independent occurrences;
/// removal detaches one occurrence of the listener/event pair.
pub trait EventEmitter<A>: Send + Sync {
    /// Attaches `listener` under `event`.
    fn add_listener(&self, event: &str, listener: Listener<A>);

    /// Detaches one occurrence of the listener/event pair.
    ///
    /// Detaching a pair that is not attached is a no-op.
    fn remove_listener(&self, event: &str, listener: &Listener<A>);
}

/// Capability of DOM-style targets: `addEventListener` /
/// `removeEventListener`.
///
/// Same contract as [`EventEmitter`]; only the method surface differs, to
/// match window- and node-like objects.
pub trait EventTarget<A>: Send + Sync {
    /// Attaches `listener` under `event`.
    fn add_event_listener(&self, event: &str, listener: Listener<A>);

    /// Detaches one occurrence of the listener/event pair.
    fn remove_event_listener(&self, event: &str, listener: &Listener<A>);
}
