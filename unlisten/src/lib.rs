//! # Unlisten
//!
//! Subscription lifecycle management: register event listeners, timers, and
//! other acquire/release resources, then tear them all down with one call.
//!
//! The library is a thin bookkeeping layer with two pieces:
//!
//! - **Registration primitives**: free functions that perform one
//!   registration against an injected host capability and capture the
//!   matching release as an [`Unsubscribe`] handle
//! - **Collector**: [`SubscriptionCollector`] mirrors each primitive,
//!   tracking every captured release in registration order for bulk release
//!
//! Failures during registration or release never propagate; they go to an
//! injectable [`ErrorSink`] and execution continues, so one bad cleanup can
//! never leak its siblings.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use unlisten::prelude::*;
//! use unlisten::testing::{ManualTimerHost, MockEmitter};
//!
//! let emitter = Arc::new(MockEmitter::<u32>::new());
//! let timers = Arc::new(ManualTimerHost::new());
//! let subs = SubscriptionCollector::new();
//!
//! subs.subscribe_event(&emitter, "tick", listener(|n: &u32| {
//!     println!("tick {n}");
//! }));
//! subs.subscribe_timeout(&timers, |()| println!("fired"), Duration::from_millis(1000), ());
//!
//! // One call releases everything, in registration order.
//! subs.unsubscribe_all();
//! assert!(subs.is_empty());
//! ```
//!
//! [`Unsubscribe`]: release::Unsubscribe
//! [`SubscriptionCollector`]: collector::SubscriptionCollector
//! [`ErrorSink`]: report::ErrorSink

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod collector;
pub mod errors;
pub mod hosts;
pub mod release;
pub mod report;
pub mod subscribe;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collector::SubscriptionCollector;
    pub use crate::errors::SubscriptionError;
    pub use crate::hosts::{
        listener, EventEmitter, EventTarget, Listener, TimerHost, TimerId, TokioTimerHost,
    };
    pub use crate::release::{IntoReleases, Unsubscribe};
    pub use crate::report::{
        CollectingErrorSink, ErrorSink, NoOpErrorSink, TracingErrorSink,
    };
    pub use crate::subscribe::{
        subscribe, subscribe_dom_event, subscribe_event, subscribe_interval, subscribe_timeout,
        subscribe_with, unsubscribe_all, unsubscribe_all_with,
    };
}
