//! Unified error types for the copydesk crate.
//!
//! Three boundaries, three policies:
//! - [`ToolError`] is caught at the tool boundary and turned into a text
//!   answer; the router never fails its caller.
//! - [`OrchestrationError`] is recorded into the active span and then
//!   returned to the caller; pipeline failures are never hidden.
//! - [`TraceError`] is swallowed at the tracing boundary on every path, so
//!   telemetry trouble never affects primary results.

use std::fmt;

/// Result type alias for copydesk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the copydesk crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Pipeline runtime error.
    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    /// Tool execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Tracing backend error.
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error type for the pipeline orchestration runtime.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OrchestrationError {
    /// The chat provider failed and no retry budget remained.
    #[error("Agent '{agent}' failed after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        /// Role of the agent whose task failed.
        agent: String,
        /// Number of attempts made, including the first.
        attempts: usize,
        /// The final provider error.
        source: LlmError,
    },

    /// The search collaborator failed.
    #[error("Search failed: {0}")]
    Search(String),

    /// A task referenced an agent index outside the supplied agent list.
    #[error("Task {task} references unknown agent index {agent}")]
    UnknownAgent {
        /// Position of the offending task.
        task: usize,
        /// The out-of-range agent index.
        agent: usize,
    },

    /// A task referenced a context task that has not run yet.
    #[error("Task {task} references unavailable context task {context}")]
    UnknownContext {
        /// Position of the offending task.
        task: usize,
        /// The out-of-range or forward context index.
        context: usize,
    },

    /// The runtime was given nothing to execute.
    #[error("Pipeline contains no tasks")]
    EmptyPlan,
}

impl OrchestrationError {
    /// Create a search failure error.
    #[must_use]
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Create a retries-exhausted error.
    #[must_use]
    pub fn retries_exhausted(agent: impl Into<String>, attempts: usize, source: LlmError) -> Self {
        Self::RetriesExhausted {
            agent: agent.into(),
            attempts,
            source,
        }
    }
}

/// Error type for the tracing backend.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum TraceError {
    /// Network or connection failure while reaching the backend.
    #[error("Tracing backend unreachable: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("Tracing backend rejected the write: HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// A span payload could not be encoded.
    #[error("Span payload encoding failed: {0}")]
    Encode(String),

    /// The backend client is missing required configuration.
    #[error("Tracing backend misconfigured: {0}")]
    Config(String),
}

impl TraceError {
    /// Create a network error.
    #[must_use]
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a rejected-write error.
    #[must_use]
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for TraceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("Request timed out".into())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

/// Error type for LLM provider operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// The provider name (e.g., "groq").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Rate limit exceeded.
    RateLimited,
    /// Response format error.
    ResponseFormat,
    /// Network or connection error.
    Network,
    /// HTTP status error.
    HttpStatus,
    /// Provider-specific error.
    Provider,
}

impl LlmError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Auth,
            provider: Some(provider.into()),
            message: message.into(),
            code: None,
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            provider: Some(provider.into()),
            message: "Rate limit exceeded. Please retry after some time.".into(),
            code: None,
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ResponseFormat,
            provider: None,
            message: format!("Expected {}, got {}", expected.into(), got.into()),
            code: None,
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Network,
            provider: None,
            message: message.into(),
            code: None,
        }
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::HttpStatus,
            provider: None,
            message: format!("HTTP {status}: {}", body.into()),
            code: Some(status.to_string()),
        }
    }

    /// Create a provider-specific error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Provider,
            provider: Some(provider.into()),
            message: message.into(),
            code: None,
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: LlmErrorKind::Provider,
            provider: Some(provider.into()),
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Check if this is a retryable error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, LlmErrorKind::RateLimited | LlmErrorKind::Network)
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Error type for tool execution failures.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Error during tool execution.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Tool not found in the registry.
    #[error("Tool not found: {0}")]
    NotFound(String),
}

impl ToolError {
    /// Create an execution error.
    #[must_use]
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Execution(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Execution(s.to_string())
    }
}
