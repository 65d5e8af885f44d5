//! CLI binary for companion search.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use companion::interactive::{self, SessionCommand};
use companion::{CompanionConfig, render_summary};
use companion_search::{Aggregator, classify};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Companion search: ask several web search engines at once.
#[derive(Parser)]
#[command(name = "companion-search", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run one search and print the merged results.
    Search {
        /// The query text.
        query: String,
        /// Print results as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Show the time-sensitivity category and cache TTL of a query.
    Classify {
        /// The query text.
        query: String,
    },

    /// Read queries from stdin, one per line, sharing one cache.
    /// `:refresh <text>`, `:sweep` and `:stats` manage the cache.
    Interactive,

    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Interactive);

    if let Command::InitConfig { force } = command {
        return init_config(cli.config, force);
    }

    let config = CompanionConfig::load(cli.config.as_deref())?;
    let _log_guard = companion::logging::init(&config.logging)?;

    match command {
        Command::Search { query, json } => run_search(&config, &query, json).await,
        Command::Classify { query } => {
            let classification = classify(&query);
            println!(
                "{}\t{}s\tcacheable={}",
                classification.category,
                classification.ttl_secs,
                classification.is_cacheable()
            );
            Ok(())
        }
        Command::Interactive => run_interactive(&config).await,
        Command::InitConfig { .. } => Ok(()),
    }
}

async fn run_search(config: &CompanionConfig, query: &str, json: bool) -> anyhow::Result<()> {
    config.validate()?;
    let aggregator = Aggregator::from_config(&config.search)?;
    let results = aggregator.search(query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!(
            "{}",
            render_summary(query, &results, config.output.max_summary_bytes)
        );
    }
    Ok(())
}

async fn run_interactive(config: &CompanionConfig) -> anyhow::Result<()> {
    config.validate()?;
    let aggregator = Arc::new(Aggregator::from_config(&config.search)?);
    let sweeper =
        aggregator.spawn_cleanup(Duration::from_secs(config.search.cleanup_interval_secs));

    println!(
        "companion-search v{} ({} engines). :help for commands, empty line or Ctrl+C to quit.",
        env!("CARGO_PKG_VERSION"),
        aggregator.engines().len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, shutting down...");
                None
            }
        };
        let Some(line) = line else { break };
        match interactive::parse_line(&line) {
            SessionCommand::Quit => break,
            SessionCommand::Search(query) => {
                let results = aggregator.search(query).await;
                println!(
                    "{}\n",
                    render_summary(query, &results, config.output.max_summary_bytes)
                );
            }
            SessionCommand::Refresh(pattern) => {
                let evicted = aggregator.invalidate_by_pattern(pattern).await;
                println!("evicted {evicted} cached answer(s) matching \"{pattern}\"\n");
            }
            SessionCommand::Sweep => {
                let evicted = aggregator.cleanup_expired().await;
                println!("evicted {evicted} expired answer(s)\n");
            }
            SessionCommand::Stats => {
                println!("{}", interactive::render_stats(&aggregator.cache_stats()));
                for (engine, state, failures) in aggregator.engine_health() {
                    println!("  {engine}: {state:?} ({failures} consecutive failures)");
                }
                println!();
            }
            SessionCommand::Help => println!("{}\n", interactive::HELP),
            SessionCommand::Invalid(input) => {
                println!("unrecognised command: {input} (try :help)\n");
            }
        }
    }

    let stats = aggregator.cache_stats();
    info!(
        entries = stats.entries,
        hits = stats.hits,
        misses = stats.misses,
        hit_rate = stats.hit_rate,
        "cache at exit"
    );
    sweeper.abort();
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(CompanionConfig::default_config_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    CompanionConfig::default().save_to_file(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}
