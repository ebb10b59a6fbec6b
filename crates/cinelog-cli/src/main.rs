//! Cinelog - org-mode movie catalog maintenance.
//!
//! This binary wraps the cinelog-core workflows behind one subcommand
//! per batch job: match, enrich, dedupe, inject.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cinelog_core::config::{NetworkConfig, TmdbConfig};
use cinelog_core::secrets::resolve_api_key;
use cinelog_core::tmdb::TmdbClient;
use cinelog_core::workflow::{run_dedupe, run_enrich, run_inject, run_match, RunOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "cinelog")]
#[command(about = "Enrich an org-mode movie catalog from TMDB")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to the catalog file
    file: PathBuf,

    /// Report what would change without touching the file
    #[arg(long)]
    dry_run: bool,

    /// Skip the backup-once copy
    #[arg(long)]
    no_backup: bool,

    /// Stop after this many processed records
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct ApiArgs {
    /// TMDB API key (default: `pass tmdb/api-key`)
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve unidentified records against the TMDB search API
    Match {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Backfill metadata for records that already have a TMDB_ID
    Enrich {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Remove superseded duplicate property lines (offline)
    Dedupe {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Merge reviewed batch*.json knowledge files into the catalog (offline)
    Inject {
        #[command(flatten)]
        common: CommonArgs,
        /// Directory containing batch*.json files
        batches: PathBuf,
    },
}

impl CommonArgs {
    fn options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            backup: !self.no_backup,
            limit: self.limit,
        }
    }
}

async fn make_client(api: &ApiArgs) -> Result<TmdbClient> {
    let key = resolve_api_key(api.api_key.clone()).await?;
    Ok(TmdbClient::new(TmdbConfig::new(key))?)
}

async fn run(command: &Command) -> Result<()> {
    match command {
        Command::Match { common, api } => {
            let client = make_client(api).await?;
            let stats = run_match(
                &common.file,
                &client,
                NetworkConfig::RATE_LIMIT_DELAY,
                &common.options(),
            )
            .await?;
            println!("Records examined:  {}", stats.total);
            println!("Matched:           {}", stats.matched);
            println!("Needs review:      {}", stats.review);
            println!("No results:        {}", stats.no_results);
            println!("Skipped:           {}", stats.skipped);
        }
        Command::Enrich { common, api } => {
            let client = make_client(api).await?;
            let stats = run_enrich(
                &common.file,
                &client,
                NetworkConfig::RATE_LIMIT_DELAY,
                &common.options(),
            )
            .await?;
            println!("Records examined:  {}", stats.total);
            println!("Enriched:          {}", stats.enriched);
            println!("Errors:            {}", stats.errors);
            println!("Skipped (gated):   {}", stats.skipped_gated);
            println!("Skipped (no id):   {}", stats.skipped_no_id);
        }
        Command::Dedupe { common } => {
            let stats = run_dedupe(&common.file, &common.options())?;
            println!("Records examined:  {}", stats.total);
            println!("Records changed:   {}", stats.records_changed);
            println!("Lines removed:     {}", stats.lines_removed);
            println!("Value mismatches:  {}", stats.value_mismatches);
            for (key, count) in &stats.by_key {
                println!("  {}: {}", key, count);
            }
        }
        Command::Inject { common, batches } => {
            let stats = run_inject(&common.file, batches, &common.options())?;
            println!("Entries loaded:    {}", stats.entries_loaded);
            println!("Records updated:   {}", stats.records_updated);
            println!("Unmatched:         {}", stats.unmatched);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match run(&cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
