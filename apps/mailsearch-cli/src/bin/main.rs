//! mailsearch: hybrid semantic + keyword search over a JSON email export.
//!
//! Results and stats go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mailsearch_core::config::{Config, SearchSettings};
use mailsearch_core::email::{email_text, load_emails, Email};
use mailsearch_core::traits::EmbedProvider;
use mailsearch_embed::get_default_provider;
use mailsearch_hybrid::HybridSearchEngine;

#[derive(Parser)]
#[command(name = "mailsearch", version, about = "Search an email export by meaning and by keyword")]
struct Cli {
    /// Embedding cache directory (overrides `search.cache_dir`)
    #[arg(long, global = true, env = "MAILSEARCH_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// More log output (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank emails for a query and/or keywords
    Search {
        /// JSON array of emails
        #[arg(long)]
        emails: PathBuf,
        /// Natural-language query
        #[arg(short, long)]
        query: Option<String>,
        /// Exact keyword; repeat for several
        #[arg(short = 'k', long = "keyword")]
        keywords: Vec<String>,
        /// Maximum results (overrides `search.limit`)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Embed every email into the cache ahead of searching
    Embed {
        /// JSON array of emails
        #[arg(long)]
        emails: PathBuf,
    },
}

#[derive(Serialize)]
struct Hit<'a> {
    score: f32,
    #[serde(flatten)]
    email: &'a Email,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load().context("loading config")?;
    let mut settings: SearchSettings = config.search_settings()?;
    if let Some(dir) = &cli.cache_dir {
        settings.cache_dir = dir.to_string_lossy().into_owned();
    }
    let base = std::env::current_dir()?;
    let provider: Arc<dyn EmbedProvider> = Arc::from(get_default_provider(settings.embedding_dim));
    let engine = HybridSearchEngine::from_settings(provider, &settings, &base)?;

    match cli.command {
        Command::Search { emails, query, keywords, limit } => {
            let emails = load_emails(&emails)?;
            let limit = limit.unwrap_or(settings.limit);
            let ranked = engine.search_raw(query, Some(keywords), &emails, email_text, limit).await?;
            let hits: Vec<Hit> = ranked.into_iter().map(|r| Hit { score: r.score, email: r.item }).collect();
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Command::Embed { emails } => {
            let emails = load_emails(&emails)?;
            let (_, stats) = engine.batcher().embed_all_with_stats(&emails, email_text).await?;
            info!(cache = %engine.batcher().cache().dir().display(), "cache warm");
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
