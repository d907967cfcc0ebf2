/*
newsgpt - main.rs
Starts the web shell by default, or runs a single summarize / publish action from the command line.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsgpt::processing::{self, GateStage, SummarizeOutcome};
use newsgpt::server::launch_rocket;

#[derive(Parser, Debug)]
#[command(name = "newsgpt", about = "Translate, summarize and publish news articles")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web shell (default)
    Serve,
    /// Fetch, translate and summarize one article, print the summary
    Summarize {
        url: String,
    },
    /// Compose a post from a summary and publish it to Mastodon
    Publish {
        url: String,
        /// Summary text
        #[arg(long, conflicts_with = "summary_file", required_unless_present = "summary_file")]
        summary: Option<String>,
        /// Read the summary from a file (e.g. one under logs/)
        #[arg(long, value_name = "FILE")]
        summary_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Credentials may live in a .env file next to the binary
    if let Ok(path) = dotenv::dotenv() {
        info!(path = ?path, "loaded environment file");
    }

    let config = load_config(args.config).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => launch_rocket(Arc::new(config)).await,
        Command::Summarize { url } => run_summarize(&config, &url).await,
        Command::Publish {
            url,
            summary,
            summary_file,
        } => {
            let summary = match (summary, summary_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read summary file {}", path.display()))?,
                (None, None) => anyhow::bail!("either --summary or --summary-file is required"),
            };
            run_publish(&config, &summary, &url).await
        }
    }
}

/// Merge config.default.toml with config.toml (or --config), then pull credentials from
/// the environment.
async fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = explicit {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let mut config = Config::load_with_defaults(
        default_path.exists().then_some(default_path.as_path()),
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;
    config.resolve_credentials();

    info!(default_file = ?default_path, override_file = ?override_path, "configuration loaded");
    Ok(config)
}

async fn run_summarize(config: &Config, url: &str) -> Result<()> {
    match processing::summarize_article(config, url).await? {
        SummarizeOutcome::Summarized {
            translated,
            summary,
            ..
        } => {
            println!("{}\n", translated.title);
            println!("{}", summary.text);
            info!("summary logged to {}", summary.log_path.display());
        }
        SummarizeOutcome::TooShort(stage) => {
            let which = match stage {
                GateStage::Source => "source article",
                GateStage::Translated => "translated article",
            };
            println!("Article is too short ({which})");
        }
    }
    Ok(())
}

async fn run_publish(config: &Config, summary: &str, url: &str) -> Result<()> {
    let post = processing::publish_summary(config, summary, url).await?;
    println!("{post}");
    println!("Published to Mastodon!");
    Ok(())
}
