//! Word counting tool.

use crate::error::ToolError;
use crate::tool::Tool;

/// Reports the number of whitespace-delimited words in the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCountTool;

impl Tool for WordCountTool {
    fn name(&self) -> &str {
        "word_count"
    }

    fn description(&self) -> &str {
        "Count the words in the provided text"
    }

    fn call(&self, input: &str) -> Result<String, ToolError> {
        let count = input.split_whitespace().count();
        Ok(format!("The text contains {count} words."))
    }
}
