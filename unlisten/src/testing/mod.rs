//! Deterministic test doubles for the host capabilities.
//!
//! These let the registration and collector layers be exercised without a
//! real event loop, DOM, or tokio runtime.

mod mocks;

pub use mocks::{ManualTimerHost, MockEmitter};
