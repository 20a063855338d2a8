//! Sequential orchestration runtime.
//!
//! [`SequentialRuntime`] walks a plan's tasks in order: render the agent's
//! prompt, splice in context-task outputs and (for search-capable agents)
//! fresh search results, call the chat provider with a bounded retry budget,
//! and hand the final task's output back as the pipeline result.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::OrchestrationError;
use crate::providers::{ChatMessage, SharedChatProvider};
use crate::search::SharedSearchProvider;

use super::plan::{AgentSpec, PipelinePlan, TaskSpec};

/// Async interface to a pipeline execution runtime.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Execute `plan` and return the final task's output text.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] if the plan is malformed or a
    /// collaborator fails past its retry budget.
    async fn execute(&self, plan: &PipelinePlan) -> Result<String, OrchestrationError>;
}

/// A shared, reference-counted orchestrator for use across tasks.
pub type SharedOrchestrator = Arc<dyn Orchestrator>;

/// Default spacing between provider calls, to stay under rate limits.
const DEFAULT_THROTTLE: Duration = Duration::from_secs(1);

/// Runtime that executes plans one task at a time.
#[derive(Clone)]
pub struct SequentialRuntime {
    chat: SharedChatProvider,
    search: Option<SharedSearchProvider>,
    throttle: Duration,
}

impl std::fmt::Debug for SequentialRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialRuntime")
            .field("model", &self.chat.model())
            .field("search", &self.search.is_some())
            .field("throttle", &self.throttle)
            .finish()
    }
}

impl SequentialRuntime {
    /// Create a runtime over the given chat provider, without search.
    #[must_use]
    pub fn new(chat: SharedChatProvider) -> Self {
        Self {
            chat,
            search: None,
            throttle: DEFAULT_THROTTLE,
        }
    }

    /// Attach a search collaborator for search-capable agents.
    #[must_use]
    pub fn with_search(mut self, search: SharedSearchProvider) -> Self {
        self.search = Some(search);
        self
    }

    /// Space provider calls by `throttle`; zero disables the delay.
    #[must_use]
    pub const fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Whether a search collaborator is attached.
    #[must_use]
    pub const fn has_search(&self) -> bool {
        self.search.is_some()
    }

    /// Run one task: gather search results if applicable, render the
    /// prompt, and call the provider inside the agent's retry budget.
    async fn run_task(
        &self,
        agent: &AgentSpec,
        task: &TaskSpec,
        context_outputs: &[&str],
    ) -> Result<String, OrchestrationError> {
        let search_results = match (&self.search, agent.use_search) {
            (Some(search), true) => Some(search.search(&task.subject).await?),
            _ => None,
        };

        let messages = [
            ChatMessage::system(render_system_prompt(agent)),
            ChatMessage::user(render_task_prompt(
                task,
                context_outputs,
                search_results.as_deref(),
            )),
        ];

        let budget = agent.max_attempts.max(1);
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.chat.chat(&messages).await {
                Ok(output) => {
                    debug!(agent = %agent.role, attempts, "task completed");
                    return Ok(output);
                }
                Err(err) if err.is_retryable() && attempts < budget => {
                    debug!(agent = %agent.role, attempts, error = %err, "retrying task");
                    if !self.throttle.is_zero() {
                        tokio::time::sleep(self.throttle).await;
                    }
                }
                Err(err) => {
                    return Err(OrchestrationError::retries_exhausted(
                        &agent.role,
                        attempts,
                        err,
                    ));
                }
            }
        }
    }
}

#[async_trait]
impl Orchestrator for SequentialRuntime {
    async fn execute(&self, plan: &PipelinePlan) -> Result<String, OrchestrationError> {
        if plan.tasks.is_empty() {
            return Err(OrchestrationError::EmptyPlan);
        }

        let mut outputs: Vec<String> = Vec::with_capacity(plan.tasks.len());
        for (index, task) in plan.tasks.iter().enumerate() {
            let agent = plan.agents.get(task.agent).ok_or(
                OrchestrationError::UnknownAgent {
                    task: index,
                    agent: task.agent,
                },
            )?;

            let mut context_outputs = Vec::with_capacity(task.context.len());
            for &ctx in &task.context {
                let output = (ctx < index).then(|| outputs.get(ctx)).flatten().ok_or(
                    OrchestrationError::UnknownContext {
                        task: index,
                        context: ctx,
                    },
                )?;
                context_outputs.push(output.as_str());
            }

            if !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }

            let output = self.run_task(agent, task, &context_outputs).await?;
            outputs.push(output);
        }

        // Non-empty by the check above.
        Ok(outputs.pop().unwrap_or_default())
    }
}

/// System prompt from the agent's role card.
fn render_system_prompt(agent: &AgentSpec) -> String {
    format!(
        "You are {role}. Your goal: {goal} Background: {backstory}",
        role = agent.role,
        goal = agent.goal,
        backstory = agent.backstory,
    )
}

/// User prompt from the task, its context outputs, and search results.
fn render_task_prompt(
    task: &TaskSpec,
    context_outputs: &[&str],
    search_results: Option<&str>,
) -> String {
    let mut prompt = task.description.clone();
    let _ = write!(prompt, "\n\nExpected output: {}", task.expected_output);

    if let Some(results) = search_results {
        let _ = write!(prompt, "\n\nSearch results:\n{results}");
    }
    if !context_outputs.is_empty() {
        let _ = write!(prompt, "\n\nContext from earlier work:");
        for output in context_outputs {
            let _ = write!(prompt, "\n{output}");
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::pipeline::plan::{Process, quick_research_plan, research_and_write_plan};
    use crate::providers::ChatProvider;
    use crate::search::SearchProvider;
    use std::sync::Mutex;

    /// Provider that replays scripted outcomes and records the prompts.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        script: Mutex<Vec<Result<String, LlmError>>>,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedProvider {
        fn replying(replies: &[&str]) -> Self {
            Self {
                script: Mutex::new(
                    replies.iter().rev().map(|r| Ok((*r).to_owned())).collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn scripted(outcomes: Vec<Result<String, LlmError>>) -> Self {
            Self {
                script: Mutex::new(outcomes.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompt(&self, call: usize) -> Vec<ChatMessage> {
            self.prompts.lock().unwrap()[call].clone()
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(LlmError::provider("scripted", "script exhausted")))
        }
    }

    #[derive(Debug)]
    struct FixedSearch(&'static str);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, _query: &str) -> Result<String, OrchestrationError> {
            Ok(self.0.to_owned())
        }
    }

    #[derive(Debug)]
    struct BrokenSearch;

    #[async_trait]
    impl SearchProvider for BrokenSearch {
        fn provider_name(&self) -> &str {
            "broken"
        }

        async fn search(&self, _query: &str) -> Result<String, OrchestrationError> {
            Err(OrchestrationError::search("search down"))
        }
    }

    fn runtime(provider: Arc<ScriptedProvider>) -> SequentialRuntime {
        SequentialRuntime::new(provider).with_throttle(Duration::ZERO)
    }

    #[tokio::test]
    async fn two_stage_plan_splices_context_into_the_writer_prompt() {
        let provider = Arc::new(ScriptedProvider::replying(&["fact one, fact two", "the article"]));
        let runtime = runtime(Arc::clone(&provider));

        let plan = research_and_write_plan("green tea", "article");
        let result = runtime.execute(&plan).await.unwrap();
        assert_eq!(result, "the article");
        assert_eq!(provider.calls(), 2);

        let research_prompt = provider.prompt(0);
        assert!(research_prompt[0].content.starts_with("You are Researcher."));
        assert!(research_prompt[1].content.contains("Research: green tea."));
        assert!(research_prompt[1].content.contains("Expected output: Key facts list"));

        let write_prompt = provider.prompt(1);
        assert!(write_prompt[0].content.starts_with("You are Writer."));
        assert!(write_prompt[1].content.contains("Context from earlier work:"));
        assert!(write_prompt[1].content.contains("fact one, fact two"));
    }

    #[tokio::test]
    async fn search_results_reach_only_search_capable_agents() {
        let provider = Arc::new(ScriptedProvider::replying(&["facts", "article"]));
        let runtime = runtime(Arc::clone(&provider))
            .with_search(Arc::new(FixedSearch("- Green tea\n  (https://example.com)")));

        let plan = research_and_write_plan("green tea", "article");
        runtime.execute(&plan).await.unwrap();

        assert!(provider.prompt(0)[1].content.contains("Search results:"));
        assert!(!provider.prompt(1)[1].content.contains("Search results:"));
    }

    #[tokio::test]
    async fn quick_research_runs_without_search_attached() {
        let provider = Arc::new(ScriptedProvider::replying(&["short answer"]));
        let runtime = runtime(Arc::clone(&provider));

        let plan = quick_research_plan("what is green tea");
        let result = runtime.execute(&plan).await.unwrap();
        assert_eq!(result, "short answer");
        assert!(!provider.prompt(0)[1].content.contains("Search results:"));
    }

    #[tokio::test]
    async fn retryable_errors_are_retried_within_the_budget() {
        let provider = Arc::new(ScriptedProvider::scripted(vec![
            Err(LlmError::rate_limited("scripted")),
            Err(LlmError::network("socket closed")),
            Ok("answer".to_owned()),
        ]));
        let runtime = runtime(Arc::clone(&provider));

        let result = runtime.execute(&quick_research_plan("q")).await.unwrap();
        assert_eq!(result, "answer");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_on_the_first_attempt() {
        let provider = Arc::new(ScriptedProvider::scripted(vec![Err(LlmError::auth(
            "scripted",
            "bad key",
        ))]));
        let runtime = runtime(Arc::clone(&provider));

        let err = runtime.execute(&quick_research_plan("q")).await.unwrap_err();
        match err {
            OrchestrationError::RetriesExhausted { agent, attempts, .. } => {
                assert_eq!(agent, "Researcher");
                assert_eq!(attempts, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn budget_exhaustion_reports_the_attempt_count() {
        let provider = Arc::new(ScriptedProvider::scripted(
            (0..5).map(|_| Err(LlmError::rate_limited("scripted"))).collect(),
        ));
        let runtime = runtime(Arc::clone(&provider));

        let err = runtime.execute(&quick_research_plan("q")).await.unwrap_err();
        match err {
            OrchestrationError::RetriesExhausted { attempts, source, .. } => {
                assert_eq!(attempts, 5);
                assert!(source.is_retryable());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(provider.calls(), 5);
    }

    #[tokio::test]
    async fn search_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::replying(&["unused"]));
        let runtime = runtime(Arc::clone(&provider)).with_search(Arc::new(BrokenSearch));

        let err = runtime.execute(&quick_research_plan("q")).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Search(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn empty_plans_are_rejected() {
        let provider = Arc::new(ScriptedProvider::default());
        let runtime = runtime(provider);

        let plan = PipelinePlan {
            agents: vec![AgentSpec::researcher()],
            tasks: vec![],
            process: Process::Sequential,
        };
        assert!(matches!(
            runtime.execute(&plan).await.unwrap_err(),
            OrchestrationError::EmptyPlan
        ));
    }

    #[tokio::test]
    async fn out_of_range_references_are_rejected() {
        let provider = Arc::new(ScriptedProvider::replying(&["x"]));
        let runtime = runtime(provider);

        let mut plan = quick_research_plan("q");
        plan.tasks[0].agent = 7;
        assert!(matches!(
            runtime.execute(&plan).await.unwrap_err(),
            OrchestrationError::UnknownAgent { task: 0, agent: 7 }
        ));

        let mut plan = quick_research_plan("q");
        // A task may only reference earlier tasks.
        plan.tasks[0].context = vec![0];
        assert!(matches!(
            runtime.execute(&plan).await.unwrap_err(),
            OrchestrationError::UnknownContext { task: 0, context: 0 }
        ));
    }
}
