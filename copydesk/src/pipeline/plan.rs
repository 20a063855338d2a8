//! Pipeline plans: agents, tasks, and the two fixed plan builders.

/// Role description for one pipeline agent.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Role name, e.g. `Researcher`.
    pub role: String,
    /// One-line goal fed into the system prompt.
    pub goal: String,
    /// Short backstory fed into the system prompt.
    pub backstory: String,
    /// Whether the search collaborator is spliced into this agent's prompts.
    pub use_search: bool,
    /// Provider attempts allowed per task, including the first.
    pub max_attempts: usize,
}

impl AgentSpec {
    /// The research agent: search-capable fact finder.
    #[must_use]
    pub fn researcher() -> Self {
        Self {
            role: "Researcher".to_owned(),
            goal: "Find information".to_owned(),
            backstory: "Research expert.".to_owned(),
            use_search: true,
            max_attempts: 5,
        }
    }

    /// The writing agent: text generation only.
    #[must_use]
    pub fn writer() -> Self {
        Self {
            role: "Writer".to_owned(),
            goal: "Write content".to_owned(),
            backstory: "Content writer.".to_owned(),
            use_search: false,
            max_attempts: 5,
        }
    }
}

/// One unit of work in a plan.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// What to do, rendered into the user prompt.
    pub description: String,
    /// What the result should look like.
    pub expected_output: String,
    /// The subject line handed to the search collaborator for
    /// search-capable agents.
    pub subject: String,
    /// Index of the agent that runs this task.
    pub agent: usize,
    /// Indices of earlier tasks whose outputs feed this one.
    pub context: Vec<usize>,
}

/// Task sequencing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Process {
    /// Tasks run in list order, each seeing its context tasks' outputs.
    #[default]
    Sequential,
}

/// A complete pipeline: agents, tasks, and how to sequence them.
#[derive(Debug, Clone)]
pub struct PipelinePlan {
    /// The agents tasks can reference by index.
    pub agents: Vec<AgentSpec>,
    /// The tasks, in execution order.
    pub tasks: Vec<TaskSpec>,
    /// Sequencing mode.
    pub process: Process,
}

/// The two-stage research-then-write plan.
///
/// Task descriptions stay short on purpose to save tokens.
#[must_use]
pub fn research_and_write_plan(topic: &str, content_type: &str) -> PipelinePlan {
    PipelinePlan {
        agents: vec![AgentSpec::researcher(), AgentSpec::writer()],
        tasks: vec![
            TaskSpec {
                description: format!("Research: {topic}. Find 3-5 key facts."),
                expected_output: "Key facts list".to_owned(),
                subject: topic.to_owned(),
                agent: 0,
                context: vec![],
            },
            TaskSpec {
                description: format!("Write brief {content_type} on {topic}."),
                expected_output: format!("Short {content_type}"),
                subject: topic.to_owned(),
                agent: 1,
                context: vec![0],
            },
        ],
        process: Process::Sequential,
    }
}

/// The single-stage quick-answer plan.
#[must_use]
pub fn quick_research_plan(question: &str) -> PipelinePlan {
    PipelinePlan {
        agents: vec![AgentSpec::researcher()],
        tasks: vec![TaskSpec {
            description: format!("Answer: {question}. Be brief."),
            expected_output: "Short answer".to_owned(),
            subject: question.to_owned(),
            agent: 0,
            context: vec![],
        }],
        process: Process::Sequential,
    }
}
