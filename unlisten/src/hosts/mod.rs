//! Host capability interfaces.
//!
//! The library never reaches for ambient globals; emitters, DOM-style
//! targets, and timer registries are injected through these traits so the
//! core stays testable without a real event loop or DOM.

mod emitter;
mod timer;

pub use emitter::{listener, same_listener, EventEmitter, EventTarget, Listener};
pub use timer::{TimerHost, TimerId, TokioTimerHost};
