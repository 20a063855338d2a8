//! Built-in tools for the router.
//!
//! Three pure text-in, text-out tools: a restricted arithmetic calculator,
//! a canned joke picker, and a word counter. [`builtin_tools`] returns them
//! boxed and ready for a [`ToolRegistry`](crate::tool::ToolRegistry).

mod calculator;
mod joke;
mod word_count;

pub use calculator::{CalculatorTool, NO_EXPRESSION_MESSAGE};
pub use joke::{JOKES, RandomJokeTool};
pub use word_count::WordCountTool;

use crate::tool::BoxedTool;

/// All built-in tools, boxed for registry construction.
#[must_use]
pub fn builtin_tools() -> Vec<BoxedTool> {
    vec![
        Box::new(CalculatorTool),
        Box::new(RandomJokeTool),
        Box::new(WordCountTool),
    ]
}

/// Names of the built-in tools, in routing priority order.
pub const BUILTIN_TOOL_NAMES: &[&str] = &["calculator", "random_joke", "word_count"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_match_the_tools() {
        let tools = builtin_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names, BUILTIN_TOOL_NAMES);
    }
}
