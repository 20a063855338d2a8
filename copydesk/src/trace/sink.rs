//! The tracing-backend seam.
//!
//! [`TraceSink`] is the narrow interface the rest of the crate talks to:
//! begin a span, update it once, close and flush it. The sink is an
//! explicitly passed dependency, constructed once at process start and
//! threaded through calls; [`NoopTraceSink`] serves disabled tracing and
//! tests through the same code path.

use async_trait::async_trait;

use crate::error::TraceError;

use super::span::{JsonMap, Span, SpanUpdate};

/// Async interface to a tracing backend.
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait TraceSink: Send + Sync {
    /// A short backend name for logs and debug output.
    fn sink_name(&self) -> &str;

    /// Open a running span tagged with `name` and the given input payload.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] if the backend cannot accept a new span.
    async fn begin_span(&self, name: &str, input: JsonMap) -> Result<Span, TraceError>;

    /// Apply the one-shot update to the span record.
    ///
    /// The default implementation updates the local record only; backends
    /// that push updates eagerly can override it.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] if the backend rejects the update.
    async fn update_span(&self, span: &mut Span, update: SpanUpdate) -> Result<(), TraceError> {
        span.apply(update);
        Ok(())
    }

    /// Close the span and push it to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] if the write does not reach the backend.
    async fn close_and_flush(&self, span: Span) -> Result<(), TraceError>;
}

/// A heap-allocated, type-erased sink for dynamic dispatch.
pub type BoxedTraceSink = Box<dyn TraceSink>;

/// A shared, reference-counted sink for use across tasks.
pub type SharedTraceSink = std::sync::Arc<dyn TraceSink>;

/// Sink for disabled tracing.
///
/// Spans are still constructed and updated locally, so callers observe the
/// same lifecycle either way; nothing is ever sent anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceSink;

#[async_trait]
impl TraceSink for NoopTraceSink {
    fn sink_name(&self) -> &str {
        "noop"
    }

    async fn begin_span(&self, name: &str, input: JsonMap) -> Result<Span, TraceError> {
        Ok(Span::new(name, input))
    }

    async fn close_and_flush(&self, _span: Span) -> Result<(), TraceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::span::SpanStatus;
    use serde_json::json;

    #[tokio::test]
    async fn noop_sink_walks_the_full_lifecycle() {
        let sink = NoopTraceSink;
        let mut input = JsonMap::new();
        input.insert("question".into(), json!("why"));

        let mut span = sink.begin_span("demo", input).await.unwrap();
        assert_eq!(span.name, "demo");
        assert!(span.is_open());

        sink.update_span(&mut span, SpanUpdate::success(JsonMap::new()))
            .await
            .unwrap();
        assert_eq!(span.status, SpanStatus::Success);

        sink.close_and_flush(span).await.unwrap();
    }
}
