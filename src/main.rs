use anyhow::Context;
use bsky2masto::apis::bluesky::BlueskyClient;
use bsky2masto::apis::webfinger::WebfingerClient;
use bsky2masto::config::Config;
use bsky2masto::constants::{DEFAULT_IMPORT_OUTPUT, DEFAULT_MATCHES_OUTPUT};
use bsky2masto::error::MigrateError;
use bsky2masto::logging;
use bsky2masto::observability;
use bsky2masto::output::{write_import_csv, write_matches_csv};
use bsky2masto::pipeline::{MatchPipeline, PipelineOptions};
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bsky2masto")]
#[command(about = "Generate a Mastodon import CSV from Bluesky follows")]
#[command(version)]
struct Cli {
    /// Bluesky handle or DID
    #[arg(long)]
    actor: String,

    /// Output Mastodon import CSV path
    #[arg(long, default_value = DEFAULT_IMPORT_OUTPUT)]
    output: PathBuf,

    /// Detailed match CSV path
    #[arg(long, default_value = DEFAULT_MATCHES_OUTPUT)]
    matches_output: PathBuf,

    /// Max follows to scan (for testing)
    #[arg(long)]
    max_follows: Option<usize>,

    /// Also include bridged Bluesky accounts as @handle@bsky.brid.gy
    #[arg(long)]
    include_bridgy: bool,

    /// Verify extracted Mastodon handles via WebFinger
    #[arg(long)]
    verify: bool,

    /// Pause before each Bridgy check to be polite [default: 150]
    #[arg(long)]
    bridgy_pause_ms: Option<u64>,

    /// Concurrent WebFinger lookups [default: 8]
    #[arg(long)]
    workers: Option<usize>,

    /// Suppress progress logging
    #[arg(long)]
    quiet: bool,

    /// TOML config file (defaults to ./bsky2masto.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write JSON logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn error_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<MigrateError>() {
        Some(MigrateError::Status { status, reason, .. }) => {
            format!("HTTP error: {} {}", status, reason)
        }
        Some(MigrateError::Http(e)) => format!("Network error: {}", e),
        _ => format!("Unexpected error: {:#}", err),
    }
}

async fn run(cli: &Cli, mut config: Config) -> anyhow::Result<()> {
    if let Some(workers) = cli.workers {
        config.verify.workers = workers.max(1);
    }
    if let Some(pause_ms) = cli.bridgy_pause_ms {
        config.bridge.pause_ms = pause_ms;
    }

    let follows = Arc::new(BlueskyClient::new(&config.bluesky, &config.http)?);
    let verifier = Arc::new(WebfingerClient::new(
        &config.bridge,
        &config.verify,
        &config.http,
    )?);

    let options = PipelineOptions {
        max_follows: cli.max_follows,
        include_bridgy: cli.include_bridgy,
        verify: cli.verify,
        bridge_pause: Duration::from_millis(config.bridge.pause_ms),
        workers: config.verify.workers,
        page_size: config.bluesky.page_size,
        bridge_domain: config.bridge.domain.clone(),
    };

    let result = MatchPipeline::new(follows, verifier, options)
        .run(&cli.actor)
        .await?;

    let handles = result.importable_handles();

    info!("[3/3] Writing CSV files...");
    write_import_csv(&cli.output, handles.iter().cloned())
        .with_context(|| format!("writing {}", cli.output.display()))?;
    write_matches_csv(&cli.matches_output, &result.matches)
        .with_context(|| format!("writing {}", cli.matches_output.display()))?;

    let unique_handles: HashSet<&String> = handles.iter().collect();
    println!("Scanned follows: {}", result.scanned);
    println!("Matches found: {}", result.matches.len());
    println!("Unique importable handles: {}", unique_handles.len());
    println!("Wrote Mastodon import CSV: {}", cli.output.display());
    println!("Wrote detailed matches CSV: {}", cli.matches_output.display());

    observability::push_snapshot(&cli.actor, config.http.timeout()).await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Unexpected error: {}", e);
            return ExitCode::from(1);
        }
    };

    let log_dir = cli.log_dir.clone().or_else(|| config.logging.dir.clone());
    let _log_guard = logging::init_logging(cli.quiet, log_dir.as_deref());
    observability::init_metrics();

    match run(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::from(1)
        }
    }
}
