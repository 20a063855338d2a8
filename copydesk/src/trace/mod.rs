//! Span-scoped execution tracking.
//!
//! Every top-level invocation in this crate is bracketed by exactly one
//! [`Span`]: opened before the work, updated once with a success- or
//! failure-shaped output, then closed and flushed. The bracketing lives in
//! one shared helper so no call site can drift.
//!
//! # Architecture
//!
//! ```text
//! Traced / run_traced (single lifecycle path)
//!   └── dyn TraceSink
//!         ├── LangfuseSink   (batch ingestion API, basic auth)
//!         └── NoopTraceSink  (disabled tracing and tests)
//! ```
//!
//! The sink is passed explicitly and never global; telemetry failures are
//! swallowed at this boundary so they cannot affect primary results.

mod langfuse;
mod scoped;
mod sink;
mod span;

pub use langfuse::{LANGFUSE_BASE_URL, LangfuseSink};
pub use scoped::{SUMMARY_CAP, Traced, connection_test, run_traced};
pub use sink::{BoxedTraceSink, NoopTraceSink, SharedTraceSink, TraceSink};
pub use span::{JsonMap, Span, SpanStatus, SpanUpdate, timestamp};
