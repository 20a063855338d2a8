//! Rule-based tool router.
//!
//! Maps a free-text question to at most one tool using an ordered list of
//! (predicate, tool-name) rules, first match wins. The order is data, not
//! nested conditionals, so priorities stay explicit and testable on their
//! own.
//!
//! Routing is total: every question gets a text answer. A selected tool's
//! failure is folded into the answer, and questions that select nothing fall
//! back to one of two fixed sentences.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use copydesk::router::ToolRouter;
//! use copydesk::trace::NoopTraceSink;
//!
//! let router = ToolRouter::new(Arc::new(NoopTraceSink));
//! let result = router.invoke("What is 2 + 2?").await;
//! assert_eq!(result.answer, "4");
//! ```

use std::convert::Infallible;
use std::fmt;

use tracing::debug;

use crate::tool::ToolRegistry;
use crate::tools::builtin_tools;
use crate::trace::{SharedTraceSink, Traced};

/// Fixed answer for unmatched questions that mention AI.
pub const AI_FALLBACK: &str =
    "I'm an AI assistant that can do math, tell jokes, and count words. Try asking for one of those!";

/// Fixed answer for everything else that matches no rule.
pub const DONT_UNDERSTAND: &str =
    "I don't understand that question. Try asking for a calculation, a joke, or a word count.";

/// One routing rule: a predicate over the question and the tool it selects.
pub struct RouteRule {
    tool: String,
    predicate: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl fmt::Debug for RouteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRule")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

impl RouteRule {
    /// Create a rule selecting `tool` when `predicate` matches.
    pub fn new(
        tool: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            tool: tool.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Name of the tool this rule selects.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Whether this rule matches the question.
    #[must_use]
    pub fn matches(&self, question: &str) -> bool {
        (self.predicate)(question)
    }
}

/// The documented rules in priority order:
///
/// 1. an arithmetic character among `+ - * / ( )` or a digit selects
///    `calculator`,
/// 2. the substring "joke" selects `random_joke`,
/// 3. "word count" or "how many words" selects `word_count`.
///
/// Substring checks are case-insensitive. Rule 1 outranks the others, so an
/// arithmetic-looking question about jokes still goes to the calculator.
#[must_use]
pub fn default_rules() -> Vec<RouteRule> {
    vec![
        RouteRule::new("calculator", looks_arithmetic),
        RouteRule::new("random_joke", |q| q.to_lowercase().contains("joke")),
        RouteRule::new("word_count", |q| {
            let q = q.to_lowercase();
            q.contains("word count") || q.contains("how many words")
        }),
    ]
}

/// Whether the question contains an arithmetic character or an ASCII digit.
fn looks_arithmetic(question: &str) -> bool {
    question
        .chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')'))
}

/// Outcome of one routed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResult {
    /// The text answer. Never empty.
    pub answer: String,
    /// Name of the tool that was selected, if any.
    pub tool: Option<String>,
}

impl fmt::Display for RouteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.answer)
    }
}

/// Routes free-text questions to tools and records one span per invocation.
pub struct ToolRouter {
    rules: Vec<RouteRule>,
    registry: ToolRegistry,
    sink: SharedTraceSink,
}

impl fmt::Debug for ToolRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<&str> = self.rules.iter().map(RouteRule::tool).collect();
        f.debug_struct("ToolRouter")
            .field("rules", &rules)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ToolRouter {
    /// Router with the built-in tools and the documented rule order.
    #[must_use]
    pub fn new(sink: SharedTraceSink) -> Self {
        Self {
            rules: default_rules(),
            registry: ToolRegistry::with_tools(builtin_tools()),
            sink,
        }
    }

    /// Replace the rule list. Rules are evaluated in order, first match wins.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<RouteRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the tool registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The registered tools, for menu listings.
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Name of the tool the first matching rule selects, if any.
    #[must_use]
    pub fn select_tool(&self, question: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(question))
            .map(RouteRule::tool)
    }

    /// Answer `question` without recording a span.
    ///
    /// Total: returns the selected tool's answer, a text rendering of its
    /// failure, or one of the two fixed fallback sentences.
    #[must_use]
    pub fn respond(&self, question: &str) -> RouteResult {
        if let Some(name) = self.select_tool(question) {
            debug!(tool = name, "routing question");
            let answer = match self.registry.get(name) {
                Some(tool) => match tool.call(question) {
                    Ok(answer) => answer,
                    Err(err) => format!("The {name} tool couldn't answer that: {err}"),
                },
                None => format!("The {name} tool isn't available right now."),
            };
            return RouteResult {
                answer,
                tool: Some(name.to_owned()),
            };
        }

        let fallback = if question.to_lowercase().contains("ai") {
            AI_FALLBACK
        } else {
            DONT_UNDERSTAND
        };
        RouteResult {
            answer: fallback.to_owned(),
            tool: None,
        }
    }

    /// Answer `question`, recording one `answer_question` span.
    ///
    /// Never fails: tool trouble is folded into the answer text and sink
    /// trouble is swallowed by the tracing wrapper.
    pub async fn invoke(&self, question: &str) -> RouteResult {
        let selected = self.select_tool(question).map(str::to_owned);

        let outcome: Result<RouteResult, Infallible> = Traced::new("answer_question")
            .input("question", question)
            .context(
                "selected_tool",
                selected.as_deref().unwrap_or("none selected"),
            )
            .run(self.sink.as_ref(), || async {
                Ok(self.respond(question))
            })
            .await;

        match outcome {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }
}
