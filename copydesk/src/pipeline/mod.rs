//! The orchestrated pipeline runner.
//!
//! [`Pipeline`] owns the collaborators and exposes the two fixed
//! operations: the two-stage research-then-write run and the single-stage
//! quick answer. Each run is delegated to the [`Orchestrator`] and recorded
//! as exactly one span through the tracing wrapper; failures land in the
//! span and are then returned to the caller.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use copydesk::pipeline::{Pipeline, SequentialRuntime};
//! use copydesk::providers::GroqClient;
//! use copydesk::trace::NoopTraceSink;
//!
//! let runtime = SequentialRuntime::new(Arc::new(GroqClient::from_env()?));
//! let pipeline = Pipeline::new(Arc::new(runtime), Arc::new(NoopTraceSink));
//! let article = pipeline.research_and_write("green tea", "article").await?;
//! ```

mod plan;
mod runtime;

pub use plan::{
    AgentSpec, PipelinePlan, Process, TaskSpec, quick_research_plan, research_and_write_plan,
};
pub use runtime::{Orchestrator, SequentialRuntime, SharedOrchestrator};

use crate::error::OrchestrationError;
use crate::trace::{SharedTraceSink, Traced, timestamp};

/// Default content type for research-and-write runs.
pub const DEFAULT_CONTENT_TYPE: &str = "article";

/// Runs the fixed pipelines and records one span per run.
#[derive(Clone)]
pub struct Pipeline {
    runtime: SharedOrchestrator,
    sink: SharedTraceSink,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline over the given runtime and trace sink.
    #[must_use]
    pub fn new(runtime: SharedOrchestrator, sink: SharedTraceSink) -> Self {
        Self { runtime, sink }
    }

    /// Research `topic`, then write a brief `content_type` about it.
    ///
    /// Records one `research_and_write` span; its output carries the
    /// truncated result on success or the error on failure.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] if the runtime fails; the failure is
    /// recorded in the span first, never hidden.
    pub async fn research_and_write(
        &self,
        topic: &str,
        content_type: &str,
    ) -> Result<String, OrchestrationError> {
        let content_type = if content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };
        let plan = research_and_write_plan(topic, content_type);

        Traced::new("research_and_write")
            .input("topic", topic)
            .input("content_type", content_type)
            .input("timestamp", timestamp())
            .context("topic", topic)
            .context("content_type", content_type)
            .run(self.sink.as_ref(), || async {
                self.runtime.execute(&plan).await
            })
            .await
    }

    /// Answer `question` briefly with the researcher alone.
    ///
    /// Records one `quick_research` span.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] if the runtime fails.
    pub async fn quick_research(&self, question: &str) -> Result<String, OrchestrationError> {
        let plan = quick_research_plan(question);

        Traced::new("quick_research")
            .input("question", question)
            .input("timestamp", timestamp())
            .context("question", question)
            .run(self.sink.as_ref(), || async {
                self.runtime.execute(&plan).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TraceError;
    use crate::trace::{JsonMap, NoopTraceSink, Span, SpanStatus, SpanUpdate, TraceSink};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Orchestrator that records the plans it sees and replays one outcome.
    struct FakeRuntime {
        outcome: Result<String, &'static str>,
        plans: Mutex<Vec<PipelinePlan>>,
    }

    impl FakeRuntime {
        fn succeeding(output: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(output.to_owned()),
                plans: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                outcome: Err("provider down"),
                plans: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Orchestrator for FakeRuntime {
        async fn execute(&self, plan: &PipelinePlan) -> Result<String, OrchestrationError> {
            self.plans.lock().unwrap().push(plan.clone());
            self.outcome
                .clone()
                .map_err(OrchestrationError::search)
        }
    }

    /// Sink capturing the spans the pipeline records.
    #[derive(Debug, Default)]
    struct CapturingSink {
        updated: Mutex<Vec<Span>>,
    }

    #[async_trait]
    impl TraceSink for CapturingSink {
        fn sink_name(&self) -> &str {
            "capturing"
        }

        async fn begin_span(&self, name: &str, input: JsonMap) -> Result<Span, TraceError> {
            Ok(Span::new(name, input))
        }

        async fn update_span(&self, span: &mut Span, update: SpanUpdate) -> Result<(), TraceError> {
            span.apply(update);
            self.updated.lock().unwrap().push(span.clone());
            Ok(())
        }

        async fn close_and_flush(&self, _span: Span) -> Result<(), TraceError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn research_and_write_records_a_success_span() {
        let runtime = FakeRuntime::succeeding("the article");
        let sink = Arc::new(CapturingSink::default());
        let pipeline = Pipeline::new(
            Arc::clone(&runtime) as SharedOrchestrator,
            Arc::clone(&sink) as SharedTraceSink,
        );

        let result = pipeline.research_and_write("green tea", "article").await;
        assert_eq!(result.unwrap(), "the article");

        let updated = sink.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        let span = &updated[0];
        assert_eq!(span.name, "research_and_write");
        assert_eq!(span.status, SpanStatus::Success);
        assert_eq!(span.input.get("topic").unwrap(), "green tea");
        assert_eq!(span.input.get("content_type").unwrap(), "article");
        assert!(span.input.contains_key("timestamp"));
        let metadata = span.metadata.as_ref().unwrap();
        assert_eq!(metadata.get("topic").unwrap(), "green tea");
        assert!(metadata.contains_key("execution_time_seconds"));
        let output = span.output.as_ref().unwrap();
        assert_eq!(output.get("content").unwrap(), "the article");
    }

    #[tokio::test]
    async fn failures_are_recorded_then_returned() {
        let runtime = FakeRuntime::failing();
        let sink = Arc::new(CapturingSink::default());
        let pipeline = Pipeline::new(
            Arc::clone(&runtime) as SharedOrchestrator,
            Arc::clone(&sink) as SharedTraceSink,
        );

        let err = pipeline.quick_research("what is green tea").await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Search(_)));

        let updated = sink.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        let span = &updated[0];
        assert_eq!(span.name, "quick_research");
        assert_eq!(span.status, SpanStatus::Failed);
        let output = span.output.as_ref().unwrap();
        assert_eq!(output.get("status").unwrap(), "failed");
        assert!(
            output.get("error").unwrap().as_str().unwrap().contains("provider down")
        );
    }

    #[tokio::test]
    async fn blank_content_type_defaults_to_article() {
        let runtime = FakeRuntime::succeeding("out");
        let pipeline = Pipeline::new(
            Arc::clone(&runtime) as SharedOrchestrator,
            Arc::new(NoopTraceSink),
        );

        pipeline.research_and_write("tea", "  ").await.unwrap();

        let plans = runtime.plans.lock().unwrap();
        assert!(plans[0].tasks[1].description.contains("brief article"));
    }

    #[tokio::test]
    async fn noop_sink_does_not_change_the_result() {
        let runtime = FakeRuntime::succeeding("same");
        let traced = Pipeline::new(
            Arc::clone(&runtime) as SharedOrchestrator,
            Arc::new(CapturingSink::default()),
        );
        let untraced = Pipeline::new(
            Arc::clone(&runtime) as SharedOrchestrator,
            Arc::new(NoopTraceSink),
        );

        assert_eq!(
            traced.quick_research("q").await.unwrap(),
            untraced.quick_research("q").await.unwrap()
        );
    }
}
