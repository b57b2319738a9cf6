//! Error reporting sinks.
//!
//! Registration and bulk release never propagate failures; they hand each
//! caught error to an [`ErrorSink`] and continue. The sink is injectable so
//! embedders can redirect or escalate failures.

mod sink;

pub use sink::{CollectingErrorSink, ErrorSink, NoOpErrorSink, TracingErrorSink};
