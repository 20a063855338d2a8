//! Copydesk CLI - interactive research-and-writing desk.

#![allow(clippy::print_stdout)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use copydesk::pipeline::{Pipeline, SequentialRuntime, SharedOrchestrator};
use copydesk::providers::{ChatProvider as _, GroqClient};
use copydesk::router::ToolRouter;
use copydesk::search::SerperProvider;
use copydesk::trace::{LangfuseSink, NoopTraceSink, SharedTraceSink};
use copydesk_cli::Shell;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Copydesk CLI - agent pipeline and tool router with span tracing
#[derive(Parser, Debug)]
#[command(name = "copydesk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat model id (provider default if not specified)
    #[arg(short, long, env = "GROQ_MODEL")]
    model: Option<String>,

    /// Disable span tracing for this session
    #[arg(long)]
    no_trace: bool,

    /// Seconds to wait between provider calls
    #[arg(long, default_value_t = 1.0)]
    throttle: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("copydesk=debug,copydesk_cli=debug")
    } else {
        EnvFilter::new("copydesk=warn,copydesk_cli=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Tracing is on unless `--no-trace` or `LANGFUSE_ENABLED=false`/`0`.
fn tracing_wanted(no_trace: bool) -> bool {
    if no_trace {
        return false;
    }
    match std::env::var("LANGFUSE_ENABLED") {
        Ok(value) => !matches!(value.trim().to_lowercase().as_str(), "false" | "0"),
        Err(_) => true,
    }
}

/// The Langfuse sink when configured, the no-op sink otherwise.
fn build_sink(no_trace: bool) -> (SharedTraceSink, bool) {
    if !tracing_wanted(no_trace) {
        return (Arc::new(NoopTraceSink), false);
    }

    match LangfuseSink::from_env() {
        Ok(sink) => (Arc::new(sink), true),
        Err(err) => {
            warn!(error = %err, "tracing disabled");
            (Arc::new(NoopTraceSink), false)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let groq = GroqClient::from_env().context("Groq provider is required; set GROQ_API_KEY")?;
    let groq = match &args.model {
        Some(model) => groq.with_model(model),
        None => groq,
    };
    let model = groq.model().to_owned();

    let search = SerperProvider::from_env();
    let search_enabled = search.is_some();

    let (sink, trace_enabled) = build_sink(args.no_trace);

    let mut runtime = SequentialRuntime::new(Arc::new(groq))
        .with_throttle(Duration::from_secs_f64(args.throttle.max(0.0)));
    if let Some(search) = search {
        runtime = runtime.with_search(Arc::new(search));
    }

    let pipeline = Pipeline::new(
        Arc::new(runtime) as SharedOrchestrator,
        Arc::clone(&sink),
    );
    let router = ToolRouter::new(Arc::clone(&sink));

    println!("Copydesk - research & writing desk");
    println!("  model:   {model}");
    println!("  search:  {}", if search_enabled { "on" } else { "off" });
    println!("  tracing: {}", if trace_enabled { "on" } else { "off" });

    let shell = Shell::new(pipeline, router, sink);
    shell.run().await?;

    Ok(())
}
