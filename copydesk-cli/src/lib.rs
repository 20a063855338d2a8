//! Interactive shell for the copydesk research-and-writing desk.
//!
//! Pure I/O: a numbered menu, a couple of text prompts, and result
//! printing. All routing, pipeline, and tracing logic lives in the
//! `copydesk` library.

#![allow(clippy::print_stdout)]

use std::io::{self, Write};

use copydesk::pipeline::Pipeline;
use copydesk::router::ToolRouter;
use copydesk::trace::{SharedTraceSink, connection_test};

/// One entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Two-stage research-then-write run.
    ResearchAndWrite,
    /// Single-stage quick answer.
    QuickResearch,
    /// Route a question through the toolbox.
    AskTheDesk,
    /// Round-trip check against the tracing backend.
    TestTracing,
    /// Leave the shell.
    Exit,
}

impl MenuChoice {
    /// Parse a menu selection; `None` for anything off the menu.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::ResearchAndWrite),
            "2" => Some(Self::QuickResearch),
            "3" => Some(Self::AskTheDesk),
            "4" => Some(Self::TestTracing),
            "0" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// The interactive menu shell.
pub struct Shell {
    pipeline: Pipeline,
    router: ToolRouter,
    sink: SharedTraceSink,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell").finish_non_exhaustive()
    }
}

impl Shell {
    /// Create a shell over already-wired components.
    #[must_use]
    pub fn new(pipeline: Pipeline, router: ToolRouter, sink: SharedTraceSink) -> Self {
        Self {
            pipeline,
            router,
            sink,
        }
    }

    /// Run the menu loop until the user exits.
    ///
    /// Pipeline failures are printed and the loop continues; only stdin
    /// trouble ends the loop early.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] if reading stdin fails.
    pub async fn run(&self) -> io::Result<()> {
        loop {
            print_menu();
            let choice = read_line("Choice (0-4): ")?;

            match MenuChoice::parse(&choice) {
                Some(MenuChoice::Exit) => {
                    println!("Goodbye!");
                    return Ok(());
                }
                Some(MenuChoice::ResearchAndWrite) => self.research_and_write().await?,
                Some(MenuChoice::QuickResearch) => self.quick_research().await?,
                Some(MenuChoice::AskTheDesk) => self.ask_the_desk().await?,
                Some(MenuChoice::TestTracing) => self.test_tracing().await,
                None => println!("Invalid choice."),
            }
        }
    }

    async fn research_and_write(&self) -> io::Result<()> {
        let topic = read_line("\nTopic: ")?;
        if topic.is_empty() {
            println!("Topic required.");
            return Ok(());
        }
        let content_type = read_line("Type [article]: ")?;

        println!("\nExecuting (this may take a moment)...");
        match self.pipeline.research_and_write(&topic, &content_type).await {
            Ok(result) => print_block("RESULT", &result),
            Err(err) => println!("Failed: {err}"),
        }
        Ok(())
    }

    async fn quick_research(&self) -> io::Result<()> {
        let question = read_line("\nQuestion: ")?;
        if question.is_empty() {
            println!("Question required.");
            return Ok(());
        }

        println!("\nResearching...");
        match self.pipeline.quick_research(&question).await {
            Ok(answer) => print_block("ANSWER", &answer),
            Err(err) => println!("Failed: {err}"),
        }
        Ok(())
    }

    async fn ask_the_desk(&self) -> io::Result<()> {
        let question = read_line("\nQuestion: ")?;
        if question.is_empty() {
            println!("Question required.");
            return Ok(());
        }

        let result = self.router.invoke(&question).await;
        print_block("ANSWER", &result.answer);
        println!("Tool used: {}", result.tool.as_deref().unwrap_or("none"));
        Ok(())
    }

    async fn test_tracing(&self) {
        println!("\nTesting tracing backend...");
        match connection_test(self.sink.as_ref()).await {
            Ok(seconds) => println!("Connection OK ({seconds:.3}s round trip)."),
            Err(err) => println!("Connection test failed: {err}"),
        }
    }
}

fn print_menu() {
    println!("\n{}", "=".repeat(50));
    println!("1. Research & write");
    println!("2. Quick research");
    println!("3. Ask the desk");
    println!("4. Test tracing backend");
    println!("0. Exit");
    println!("{}", "=".repeat(50));
}

fn print_block(title: &str, body: &str) {
    println!("\n{}", "=".repeat(50));
    println!("{title}:");
    println!("{}", "=".repeat(50));
    println!("{body}");
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices_parse_by_number() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::ResearchAndWrite));
        assert_eq!(MenuChoice::parse(" 2 "), Some(MenuChoice::QuickResearch));
        assert_eq!(MenuChoice::parse("3"), Some(MenuChoice::AskTheDesk));
        assert_eq!(MenuChoice::parse("4"), Some(MenuChoice::TestTracing));
        assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::Exit));
    }

    #[test]
    fn off_menu_input_parses_to_none() {
        assert_eq!(MenuChoice::parse(""), None);
        assert_eq!(MenuChoice::parse("5"), None);
        assert_eq!(MenuChoice::parse("exit"), None);
    }
}
