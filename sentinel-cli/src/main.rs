//! Sentinel CLI - automated pull request review
//!
//! Reviews each changed file of a GitHub pull request with a local Ollama
//! model that can browse the repository and search the web.

mod commands;

use clap::{Parser, Subcommand};
use sentinel_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{JobArgs, ReviewArgs, TreeArgs};

/// Sentinel: LLM code review for GitHub pull requests
#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ollama model to use (overrides config and env)
    #[arg(long, global = true, env = "SENTINEL_MODEL")]
    model: Option<String>,

    /// Ollama base URL (overrides config and env)
    #[arg(long, global = true, env = "SENTINEL_OLLAMA_URL")]
    ollama_url: Option<String>,

    /// Maximum tool calls per file before the answer is forced
    #[arg(long, global = true)]
    max_steps: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Review a pull request
    #[command(visible_alias = "r")]
    Review(ReviewArgs),

    /// Print a repository's file tree
    Tree(TreeArgs),

    /// Inspect review jobs
    Job(JobArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = Config::load_with_overrides(
        cli.model.clone(),
        cli.ollama_url.clone(),
        cli.max_steps,
    )?;

    if cli.verbose {
        tracing::info!(
            model = %config.agent.model,
            ollama_url = %config.agent.ollama_url,
            max_steps = config.agent.max_steps,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("sentinel {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Review(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Tree(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Job(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("Sentinel - LLM code review for GitHub pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("Sentinel Configuration");
    println!("======================");
    println!();
    println!("Agent Settings:");
    println!("  model: {}", config.agent.model);
    println!("  ollama_url: {}", config.agent.ollama_url);
    println!("  max_steps: {}", config.agent.max_steps);
    println!("  num_ctx: {}", config.agent.num_ctx);
    println!(
        "  request_timeout: {}s",
        config.agent.request_timeout.as_secs()
    );
    println!();
    println!("Search Settings:");
    println!("  engine: {}", config.search.engine);
    println!("  max_results: {}", config.search.max_results);
    println!();
    println!("Cache Settings:");
    match config.cache.resolved_db_path() {
        Some(path) => println!("  db_path: {}", path.display()),
        None => println!("  db_path: (unavailable)"),
    }
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
