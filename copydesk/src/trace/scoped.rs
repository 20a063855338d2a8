//! Scoped traced execution.
//!
//! [`run_traced`] brackets a unit of work with span creation and span
//! completion on every exit path: open the span, run the work, attach a
//! success- or failure-shaped output plus timing metadata, close and flush.
//! One code path serves real and no-op sinks, so traced and untraced runs
//! cannot drift apart.
//!
//! Backend failures are swallowed here (logged at debug level) on both the
//! open and the flush side; the work's own result always propagates
//! unchanged. The one exception is [`connection_test`], which exists to
//! surface backend trouble to an operator.
//!
//! # Examples
//!
//! ```rust,ignore
//! let answer: Result<String, OrchestrationError> = Traced::new("quick_research")
//!     .input("question", question)
//!     .context("question", question)
//!     .run(sink.as_ref(), || async { runtime.execute(...).await })
//!     .await;
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use serde_json::json;
use tracing::debug;

use crate::error::TraceError;

use super::sink::TraceSink;
use super::span::{JsonMap, SpanUpdate};

/// Character cap applied to result text stored in a span's output payload.
pub const SUMMARY_CAP: usize = 800;

/// Builder describing one traced invocation.
///
/// Collects the span name, the input payload, and any call-context fields
/// for the metadata, then [`run`](Self::run)s the work inside the span.
#[derive(Debug, Clone)]
pub struct Traced {
    name: String,
    input: JsonMap,
    context: JsonMap,
}

impl Traced {
    /// Start describing a traced invocation named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: JsonMap::new(),
            context: JsonMap::new(),
        }
    }

    /// Add a field to the span's input payload.
    #[must_use]
    pub fn input(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.input.insert(key.into(), value.into());
        self
    }

    /// Add a call-context field to the span's metadata.
    #[must_use]
    pub fn context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Run `work` bracketed by span creation and completion.
    ///
    /// On success the span's output carries the truncated result text, its
    /// full length, and `status: "success"`; on failure it carries
    /// `{error, status: "failed"}` and the error is returned unchanged.
    /// Metadata carries the context fields plus `execution_time_seconds` on
    /// both paths. Sink failures never reach the caller.
    pub async fn run<T, E, F, Fut>(self, sink: &dyn TraceSink, work: F) -> Result<T, E>
    where
        T: Display + Send,
        E: Display + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        let Self {
            name,
            input,
            context,
        } = self;

        let started = Instant::now();
        let span = match sink.begin_span(&name, input).await {
            Ok(span) => Some(span),
            Err(err) => {
                debug!(span = %name, sink = sink.sink_name(), error = %err,
                    "failed to open span; continuing untraced");
                None
            }
        };

        let result = work().await;
        let elapsed = started.elapsed().as_secs_f64();

        let Some(mut span) = span else {
            return result;
        };

        let mut metadata = context;
        metadata.insert("execution_time_seconds".into(), json!(elapsed));

        let update = match &result {
            Ok(value) => SpanUpdate::success(success_output(&value.to_string())),
            Err(err) => SpanUpdate::failed(failure_output(&err.to_string())),
        }
        .with_metadata(metadata);

        if let Err(err) = sink.update_span(&mut span, update).await {
            debug!(span = %name, sink = sink.sink_name(), error = %err,
                "failed to update span");
        }
        if let Err(err) = sink.close_and_flush(span).await {
            debug!(span = %name, sink = sink.sink_name(), error = %err,
                "failed to flush span");
        }

        result
    }
}

/// Run `work` inside a span tagged with `name` and `input`.
///
/// Plain-function form of [`Traced`] for call sites with a ready-made input
/// payload and no extra context fields.
pub async fn run_traced<T, E, F, Fut>(
    sink: &dyn TraceSink,
    name: &str,
    input: JsonMap,
    work: F,
) -> Result<T, E>
where
    T: Display + Send,
    E: Display + Send,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send,
{
    Traced {
        name: name.into(),
        input,
        context: JsonMap::new(),
    }
    .run(sink, work)
    .await
}

/// Round-trip check against the tracing backend.
///
/// Opens, updates, and flushes one `connection_test` span. Unlike
/// [`run_traced`] this surfaces backend errors instead of swallowing them;
/// it exists so an operator can see them. Returns the round-trip time in
/// seconds.
///
/// # Errors
///
/// Returns [`TraceError`] if any of the three sink calls fails.
pub async fn connection_test(sink: &dyn TraceSink) -> Result<f64, TraceError> {
    let started = Instant::now();

    let mut input = JsonMap::new();
    input.insert("test".into(), json!("Connection check"));
    input.insert(
        "time".into(),
        json!(chrono::Utc::now().format("%H:%M:%S").to_string()),
    );
    let mut span = sink.begin_span("connection_test", input).await?;

    let mut output = JsonMap::new();
    output.insert("status".into(), json!("success"));
    output.insert("message".into(), json!("Connection OK"));

    let mut metadata = JsonMap::new();
    metadata.insert("test".into(), json!(true));
    metadata.insert(
        "execution_time_seconds".into(),
        json!(started.elapsed().as_secs_f64()),
    );

    sink.update_span(&mut span, SpanUpdate::success(output).with_metadata(metadata))
        .await?;
    sink.close_and_flush(span).await?;

    Ok(started.elapsed().as_secs_f64())
}

/// Success-shaped output payload: truncated content, full length, status.
fn success_output(text: &str) -> JsonMap {
    let mut output = JsonMap::new();
    output.insert("content".into(), json!(truncate_chars(text, SUMMARY_CAP)));
    output.insert("length".into(), json!(text.chars().count()));
    output.insert("status".into(), json!("success"));
    output
}

/// Failure-shaped output payload: `{error, status: "failed"}`.
fn failure_output(message: &str) -> JsonMap {
    let mut output = JsonMap::new();
    output.insert("error".into(), json!(message));
    output.insert("status".into(), json!("failed"));
    output
}

/// Truncate to at most `cap` characters without splitting a code point.
fn truncate_chars(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
