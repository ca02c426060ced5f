use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use chat_agent::{ClientConfig, HttpCompletionClient, ModelParams, DEFAULT_BASE_URL};
use venture_core::{Orchestrator, OrchestratorConfig};
use venture_server::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "venture-server", about = "AI planner/developer pipeline service")]
struct Args {
    /// Address to bind the HTTP listener on
    #[arg(long, env = "VENTURE_BIND", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Credential for the chat-completion service
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, env = "VENTURE_API_BASE", default_value = DEFAULT_BASE_URL)]
    api_base: String,

    /// Model id for the planner role
    #[arg(long, env = "VENTURE_PLANNER_MODEL", default_value = chat_agent::planner::DEFAULT_PLANNER_MODEL)]
    planner_model: String,

    /// Sampling temperature for the planner role
    #[arg(long, env = "VENTURE_PLANNER_TEMPERATURE", default_value_t = chat_agent::planner::DEFAULT_PLANNER_TEMPERATURE)]
    planner_temperature: f32,

    /// Model id for the developer role
    #[arg(long, env = "VENTURE_DEVELOPER_MODEL", default_value = chat_agent::developer::DEFAULT_DEVELOPER_MODEL)]
    developer_model: String,

    /// Sampling temperature for the developer role
    #[arg(long, env = "VENTURE_DEVELOPER_TEMPERATURE", default_value_t = chat_agent::developer::DEFAULT_DEVELOPER_TEMPERATURE)]
    developer_temperature: f32,

    /// Per-request completion timeout in seconds
    #[arg(long, env = "VENTURE_REQUEST_TIMEOUT", default_value_t = 120)]
    request_timeout: u64,

    /// Number of background pipeline workers
    #[arg(long, env = "VENTURE_WORKERS", default_value_t = 4)]
    workers: usize,

    /// Depth of the background job queue
    #[arg(long, env = "VENTURE_QUEUE_DEPTH", default_value_t = 32)]
    queue_depth: usize,

    /// Cap on each agent transcript, in turns (unbounded when unset)
    #[arg(long, env = "VENTURE_MAX_TRANSCRIPT_TURNS")]
    max_transcript_turns: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let client = HttpCompletionClient::new(ClientConfig {
        base_url: args.api_base,
        api_key: args.api_key,
        timeout: Duration::from_secs(args.request_timeout),
    })?;

    let config = OrchestratorConfig {
        planner_params: ModelParams::new(args.planner_model, args.planner_temperature),
        developer_params: ModelParams::new(args.developer_model, args.developer_temperature),
        max_transcript_turns: args.max_transcript_turns,
        workers: args.workers,
        queue_depth: args.queue_depth,
    };

    let orchestrator = Orchestrator::new(Arc::new(client), config);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    venture_server::serve(AppState::new(orchestrator), listener).await
}
