//! CLI binary for govsearch.

use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use govsearch::display::{format_capabilities, format_chat_response, format_results};
use govsearch::{AppConfig, Session};
use govsearch_hybrid::{ApiClient, MergeMethod, SearchApi, SearchMode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Hybrid vector + knowledge-graph search over government data.
#[derive(Parser)]
#[command(name = "govsearch", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Primary API URL (overrides config and GOVSEARCH_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Check which endpoint is reachable and report its health.
    Health,

    /// Show which retrieval systems the service has configured.
    Capabilities,

    /// Run one search and print the results.
    Search {
        /// Search text.
        query: String,

        /// vector, knowledge_graph (kg) or hybrid. Defaults to config / capabilities.
        #[arg(long)]
        mode: Option<SearchMode>,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<usize>,

        /// Weight of vector similarity in weighted merges (0.0 to 1.0).
        #[arg(long)]
        vector_weight: Option<f64>,

        /// weighted, interleave or separate.
        #[arg(long)]
        merge_method: Option<MergeMethod>,

        /// Merge vector and graph results locally instead of on the service.
        #[arg(long)]
        merge_locally: bool,
    },

    /// Chat with the assistant, grounded on search results. Reads stdin.
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so results on stdout stay pipeable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("govsearch=info,govsearch_hybrid=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env_overrides();
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    match cli.command {
        Command::Health => run_health(config).await,
        Command::Capabilities => run_capabilities(config).await,
        Command::Search {
            query,
            mode,
            limit,
            vector_weight,
            merge_method,
            merge_locally,
        } => {
            if let Some(mode) = mode {
                config.search.mode = mode.into();
            }
            if let Some(limit) = limit {
                config.search.limit = limit;
            }
            if let Some(weight) = vector_weight {
                config.search.vector_weight = weight;
            }
            if let Some(method) = merge_method {
                config.search.merge_method = method;
            }
            config.search.merge_locally |= merge_locally;
            run_search(config, &query).await
        }
        Command::Chat => run_chat(config).await,
    }
}

async fn run_health(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    let api = ApiClient::new(&config.client_config())?;
    let state = api.probe().await;
    println!("endpoint: {} ({state:?})", api.resolver().current());
    let health = api.health().await?;
    println!("status:   {}", health.status);
    if !health.timestamp.is_empty() {
        println!("time:     {}", health.timestamp);
    }
    Ok(())
}

async fn run_capabilities(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    let api = ApiClient::new(&config.client_config())?;
    api.probe().await;
    let caps = api.capabilities().await?;
    print!("{}", format_capabilities(&caps));
    Ok(())
}

async fn run_search(config: AppConfig, query: &str) -> anyhow::Result<()> {
    let session = Session::connect(config).await?;
    let outcome = session.search(query).await?;
    match outcome.notice() {
        Some(notice) => println!("{notice}"),
        None => print!("{}", format_results(&outcome.results)),
    }
    Ok(())
}

async fn run_chat(config: AppConfig) -> anyhow::Result<()> {
    let mut session = Session::connect(config).await?;
    eprintln!(
        "Connected ({} search). Ask a question; /clear resets the conversation, /quit exits.",
        session.mode()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear_history();
                println!("Conversation cleared.");
            }
            message => {
                let response = session.chat(message).await;
                println!("{}\n", format_chat_response(&response));
            }
        }
    }
    Ok(())
}
