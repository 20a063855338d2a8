//! Langfuse ingestion sink.
//!
//! Ships completed spans to a [Langfuse](https://langfuse.com) deployment
//! through the public batch ingestion endpoint: one trace-create plus one
//! span-create event per flushed span, authenticated with the project's
//! public/secret key pair via HTTP basic auth.
//!
//! # Examples
//!
//! ```rust,ignore
//! use copydesk::trace::LangfuseSink;
//!
//! // Langfuse Cloud
//! let sink = LangfuseSink::new("pk-lf-...", "sk-lf-...");
//!
//! // Self-hosted deployment
//! let sink = LangfuseSink::new("pk-lf-...", "sk-lf-...")
//!     .with_base_url("https://langfuse.internal.example.com");
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::TraceError;

use super::sink::TraceSink;
use super::span::{JsonMap, Span, SpanStatus};

/// Default Langfuse Cloud base URL.
pub const LANGFUSE_BASE_URL: &str = "https://cloud.langfuse.com";

/// Sink backed by the Langfuse batch ingestion API.
///
/// Span creation is local; the network write happens on
/// [`close_and_flush`](TraceSink::close_and_flush), one batch per span.
#[derive(Clone)]
pub struct LangfuseSink {
    http_client: reqwest::Client,
    base_url: Arc<str>,
    public_key: String,
    secret_key: String,
}

impl std::fmt::Debug for LangfuseSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangfuseSink")
            .field("base_url", &self.base_url)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl LangfuseSink {
    /// Create a sink for Langfuse Cloud with the given key pair.
    pub fn new(public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: LANGFUSE_BASE_URL.into(),
            public_key: public_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Build a sink from `LANGFUSE_PUBLIC_KEY`, `LANGFUSE_SECRET_KEY` and,
    /// when set, `LANGFUSE_HOST`.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Config`] if either key variable is missing.
    pub fn from_env() -> Result<Self, TraceError> {
        let public_key = std::env::var("LANGFUSE_PUBLIC_KEY")
            .map_err(|_| TraceError::config("LANGFUSE_PUBLIC_KEY is not set"))?;
        let secret_key = std::env::var("LANGFUSE_SECRET_KEY")
            .map_err(|_| TraceError::config("LANGFUSE_SECRET_KEY is not set"))?;

        let sink = Self::new(public_key, secret_key);
        Ok(match std::env::var("LANGFUSE_HOST") {
            Ok(host) if !host.trim().is_empty() => sink.with_base_url(host.trim()),
            _ => sink,
        })
    }

    /// Point the sink at a self-hosted deployment.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        // Normalise: strip trailing slash
        if url.ends_with('/') {
            url.pop();
        }
        self.base_url = url.into();
        self
    }

    /// Provide a custom [`reqwest::Client`] (e.g. with proxy or timeout).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    /// Build the two-event ingestion batch for one completed span.
    fn build_batch(span: &Span) -> Result<IngestionRequest, TraceError> {
        let trace_body = serde_json::to_value(TraceBody {
            id: &span.trace_id,
            name: &span.name,
            timestamp: rfc3339(span.started_at),
            input: &span.input,
            metadata: span.metadata.as_ref(),
        })?;

        let status_message = match span.status {
            SpanStatus::Failed => span
                .output
                .as_ref()
                .and_then(|o| o.get("error"))
                .and_then(serde_json::Value::as_str),
            SpanStatus::Running | SpanStatus::Success => None,
        };
        let span_body = serde_json::to_value(SpanBody {
            id: &span.id,
            trace_id: &span.trace_id,
            name: &span.name,
            start_time: rfc3339(span.started_at),
            end_time: span.ended_at.map(rfc3339),
            input: &span.input,
            output: span.output.as_ref(),
            metadata: span.metadata.as_ref(),
            level: level(span.status),
            status_message,
        })?;

        Ok(IngestionRequest {
            batch: vec![
                IngestionEvent::new("trace-create", trace_body),
                IngestionEvent::new("span-create", span_body),
            ],
        })
    }
}

#[async_trait]
impl TraceSink for LangfuseSink {
    fn sink_name(&self) -> &str {
        "langfuse"
    }

    async fn begin_span(&self, name: &str, input: JsonMap) -> Result<Span, TraceError> {
        Ok(Span::new(name, input))
    }

    async fn close_and_flush(&self, span: Span) -> Result<(), TraceError> {
        let request = Self::build_batch(&span)?;

        let response = self
            .http_client
            .post(format!("{}/api/public/ingestion", self.base_url))
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TraceError::rejected(status, body));
        }

        debug!(span = %span.name, trace = %span.trace_id, "flushed span to langfuse");
        Ok(())
    }
}

/// Langfuse observation level for a span status.
const fn level(status: SpanStatus) -> &'static str {
    match status {
        SpanStatus::Failed => "ERROR",
        SpanStatus::Running | SpanStatus::Success => "DEFAULT",
    }
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Langfuse batch ingestion shapes (private).
#[derive(Serialize)]
struct IngestionRequest {
    batch: Vec<IngestionEvent>,
}

#[derive(Serialize)]
struct IngestionEvent {
    id: String,
    timestamp: String,
    #[serde(rename = "type")]
    kind: &'static str,
    body: serde_json::Value,
}

impl IngestionEvent {
    fn new(kind: &'static str, body: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: rfc3339(Utc::now()),
            kind,
            body,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceBody<'a> {
    id: &'a str,
    name: &'a str,
    timestamp: String,
    input: &'a JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a JsonMap>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpanBody<'a> {
    id: &'a str,
    trace_id: &'a str,
    name: &'a str,
    start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,
    input: &'a JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a JsonMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a JsonMap>,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::span::SpanUpdate;
    use serde_json::json;

    #[test]
    fn base_url_strips_trailing_slash() {
        let sink = LangfuseSink::new("pk", "sk").with_base_url("https://lf.example.com/");
        assert_eq!(&*sink.base_url, "https://lf.example.com");
    }

    #[test]
    fn debug_redacts_the_secret_key() {
        let sink = LangfuseSink::new("pk-lf-visible", "sk-lf-hidden");
        let printed = format!("{sink:?}");
        assert!(printed.contains("pk-lf-visible"));
        assert!(!printed.contains("sk-lf-hidden"));
    }

    #[test]
    fn batch_pairs_trace_and_span_events() {
        let mut input = JsonMap::new();
        input.insert("topic".into(), json!("tea"));
        let mut span = Span::new("research_and_write", input);

        let mut output = JsonMap::new();
        output.insert("content".into(), json!("done"));
        span.apply(SpanUpdate::success(output));

        let request = LangfuseSink::build_batch(&span).unwrap();
        assert_eq!(request.batch.len(), 2);
        assert_eq!(request.batch[0].kind, "trace-create");
        assert_eq!(request.batch[1].kind, "span-create");

        let span_body = &request.batch[1].body;
        assert_eq!(span_body["traceId"], json!(span.trace_id));
        assert_eq!(span_body["level"], json!("DEFAULT"));
        assert!(span_body.get("startTime").is_some());
        assert!(span_body.get("endTime").is_some());
        assert!(span_body.get("statusMessage").is_none());
    }

    #[test]
    fn failed_span_maps_to_error_level_with_message() {
        let mut span = Span::new("quick_research", JsonMap::new());
        let mut output = JsonMap::new();
        output.insert("error".into(), json!("provider down"));
        output.insert("status".into(), json!("failed"));
        span.apply(SpanUpdate::failed(output));

        let request = LangfuseSink::build_batch(&span).unwrap();
        let span_body = &request.batch[1].body;
        assert_eq!(span_body["level"], json!("ERROR"));
        assert_eq!(span_body["statusMessage"], json!("provider down"));
    }
}
