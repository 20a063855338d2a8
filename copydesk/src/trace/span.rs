//! Span records: one unit of traced work with input, output, and timing.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// JSON object payload attached to span inputs, outputs and metadata.
pub type JsonMap = serde_json::Map<String, Value>;

/// Completion status of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    /// Work is still in flight.
    Running,
    /// Work finished normally.
    Success,
    /// Work failed.
    Failed,
}

impl SpanStatus {
    /// String form used in span payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// One recorded unit of traced work.
///
/// Created by [`TraceSink::begin_span`](super::TraceSink::begin_span),
/// updated exactly once, then closed and flushed. A span is owned by the
/// invocation that created it and never shared across invocations.
#[derive(Debug, Clone)]
pub struct Span {
    /// Unique span identifier.
    pub id: String,
    /// Identifier of the trace this span belongs to.
    pub trace_id: String,
    /// Logical operation name, e.g. `research_and_write`.
    pub name: String,
    /// Input payload captured at creation.
    pub input: JsonMap,
    /// Output payload, attached by the single update.
    pub output: Option<JsonMap>,
    /// Call context and timing metadata.
    pub metadata: Option<JsonMap>,
    /// Completion status.
    pub status: SpanStatus,
    /// Creation time.
    pub started_at: DateTime<Utc>,
    /// Completion time, set by the update.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Span {
    /// Create a running span with fresh identifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, input: JsonMap) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trace_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            input,
            output: None,
            metadata: None,
            status: SpanStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Apply the one-shot update, marking the span completed.
    pub fn apply(&mut self, update: SpanUpdate) {
        self.output = Some(update.output);
        self.metadata = update.metadata;
        self.status = update.status;
        self.ended_at = Some(Utc::now());
    }

    /// Whether this span has been updated yet.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.status, SpanStatus::Running)
    }
}

/// The one-shot update applied to a span before it is closed.
#[derive(Debug, Clone)]
pub struct SpanUpdate {
    /// Output payload.
    pub output: JsonMap,
    /// Metadata payload, if any.
    pub metadata: Option<JsonMap>,
    /// Final status.
    pub status: SpanStatus,
}

impl SpanUpdate {
    /// A success-shaped update with the given output payload.
    #[must_use]
    pub const fn success(output: JsonMap) -> Self {
        Self {
            output,
            metadata: None,
            status: SpanStatus::Success,
        }
    }

    /// A failure-shaped update with the given output payload.
    #[must_use]
    pub const fn failed(output: JsonMap) -> Self {
        Self {
            output,
            metadata: None,
            status: SpanStatus::Failed,
        }
    }

    /// Attach a metadata payload.
    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonMap) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Current UTC wall-clock time formatted `YYYY-MM-DD HH:MM:SS`.
///
/// Used for the human-readable `timestamp` fields in span inputs.
#[must_use]
pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
