//! Copydesk is a small research-and-writing desk: a two-agent sequential
//! pipeline (research, then write) and a keyword-routed toolbox (calculator,
//! jokes, word counts), with every invocation recorded as one trace span.
//!
//! # Architecture
//!
//! ```text
//! Pipeline (research_and_write / quick_research)
//!   └── dyn Orchestrator ── SequentialRuntime
//!         ├── dyn ChatProvider   ── GroqClient
//!         └── dyn SearchProvider ── SerperProvider
//!
//! ToolRouter (answer_question)
//!   └── ToolRegistry ── calculator | random_joke | word_count
//!
//! both wrapped by
//!   Traced / run_traced
//!     └── dyn TraceSink ── LangfuseSink | NoopTraceSink
//! ```
//!
//! Collaborators are traits, passed explicitly and shared as `Arc`s; the
//! trace sink has a no-op mode so a run without telemetry takes the exact
//! same code path as a traced one.

pub mod error;
pub mod pipeline;
pub mod providers;
pub mod router;
pub mod search;
pub mod tool;
pub mod tools;
pub mod trace;

pub use error::{Error, Result};

/// Commonly used types, re-exported for one-line imports.
pub mod prelude {
    pub use crate::error::{Error, LlmError, OrchestrationError, Result, ToolError, TraceError};
    pub use crate::pipeline::{Orchestrator, Pipeline, SequentialRuntime, SharedOrchestrator};
    pub use crate::providers::{ChatMessage, ChatProvider, GroqClient, SharedChatProvider};
    pub use crate::router::{RouteResult, RouteRule, ToolRouter};
    pub use crate::search::{SearchProvider, SerperProvider, SharedSearchProvider};
    pub use crate::tool::{Tool, ToolRegistry};
    pub use crate::tools::builtin_tools;
    pub use crate::trace::{
        LangfuseSink, NoopTraceSink, SharedTraceSink, TraceSink, Traced, connection_test,
        run_traced,
    };
}
