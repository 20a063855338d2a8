//! Canned joke tool.

use crate::error::ToolError;
use crate::tool::Tool;

/// The fixed joke list; answers are drawn from here uniformly at random.
pub const JOKES: [&str; 3] = [
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "Why did the developer go broke? Because they used up all their cache.",
    "There are only 10 kinds of people: those who understand binary and those who don't.",
];

/// Returns one of the [`JOKES`], ignoring its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJokeTool;

impl Tool for RandomJokeTool {
    fn name(&self) -> &str {
        "random_joke"
    }

    fn description(&self) -> &str {
        "Tell a random programming joke"
    }

    fn call(&self, _input: &str) -> Result<String, ToolError> {
        Ok(JOKES[fastrand::usize(..JOKES.len())].to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_answers_from_the_fixed_list() {
        let tool = RandomJokeTool;
        for _ in 0..50 {
            let joke = tool.call("tell me a joke").unwrap();
            assert!(JOKES.contains(&joke.as_str()));
        }
    }

    #[test]
    fn input_is_ignored() {
        let tool = RandomJokeTool;
        assert!(JOKES.contains(&tool.call("").unwrap().as_str()));
    }

    #[test]
    fn exactly_three_jokes() {
        assert_eq!(JOKES.len(), 3);
    }
}
