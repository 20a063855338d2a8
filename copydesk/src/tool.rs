//! Tool trait and registry.
//!
//! A [`Tool`] is a pure text-in, text-out capability registered under a
//! unique name. The [`ToolRegistry`] is populated once at process start and
//! read-only afterwards, so it can be shared freely across invocations.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ToolError;

/// A pure function from text input to text output, registered under a
/// unique name.
///
/// Tools run synchronously: the built-ins do no I/O, and a failing tool is
/// converted into a text answer at the router boundary rather than being
/// propagated.
pub trait Tool: Send + Sync {
    /// Unique tool name used for registry lookup and routing.
    fn name(&self) -> &str;

    /// Human-readable description shown in menus and debug output.
    fn description(&self) -> &str;

    /// Run the tool on `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] if the tool cannot produce an answer.
    fn call(&self, input: &str) -> Result<String, ToolError>;
}

/// A heap-allocated, type-erased tool for dynamic dispatch.
pub type BoxedTool = Box<dyn Tool>;

/// Read-only mapping from tool name to implementation.
///
/// Ordered by name so listings are deterministic.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, BoxedTool>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a list of boxed tools.
    ///
    /// Later entries win on duplicate names.
    #[must_use]
    pub fn with_tools(tools: Vec<BoxedTool>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.tools.insert(tool.name().to_owned(), tool);
        }
        registry
    }

    /// Register a tool under its own name.
    pub fn add_tool(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_owned(), Box::new(tool));
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(AsRef::as_ref)
    }

    /// Whether a tool with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
