//! # Daily Readings
//!
//! Assembles the day's three recovery readings into one bundle and writes it
//! out as JSON and Markdown.
//!
//! ## Features
//!
//! - Reads the Daily Reflection for today from a local year-long archive file
//! - Scrapes Just For Today and Spiritual Principle A Day from their sites,
//!   with bounded retries and per-attempt timeouts
//! - Serves repeat requests from an in-memory cache within its expiry window
//! - Falls back to the last persisted snapshot of a source when its live
//!   fetch fails, so a bundle is always produced
//! - Runs once, or on a fixed interval until interrupted
//!
//! ## Usage
//!
//! ```sh
//! daily_readings -c ./readings.yaml -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: each [`scrapers::SourceAdapter`] retrieves raw content
//! 2. **Normalizing**: [`normalize`] turns raw content into a `Reading`
//! 3. **Aggregating**: [`aggregator::Aggregator`] applies cache, snapshot
//!    persistence and fallback for all three sources concurrently
//! 4. **Output**: write the JSON bundle and the Markdown page

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregator;
mod cache;
mod cli;
mod config;
mod error;
mod models;
mod normalize;
mod outputs;
mod retry;
mod scrapers;
mod store;
mod utils;

use aggregator::Aggregator;
use cache::ReadingCache;
use cli::Cli;
use config::Config;
use models::Source;
use outputs::{json, markdown};
use scrapers::SourceAdapter;
use scrapers::archive::ArchiveReader;
use scrapers::http::HttpTransport;
use scrapers::site::SiteFetcher;
use store::SnapshotStore;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("daily_readings starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.json_output_dir, ?args.markdown_output_dir, ?args.interval_secs, "Parsed CLI arguments");

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    // Early check: every directory we write to must be writable
    for dir in [
        &config.snapshot_dir,
        &args.json_output_dir,
        &args.markdown_output_dir,
    ] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let transport = HttpTransport::new()?;
    let dr = ArchiveReader::new(&config.archive_path);
    let jft = SiteFetcher::new(
        Source::JustForToday,
        config.just_for_today.url.as_str(),
        transport.clone(),
        config.just_for_today.retry_policy(),
    );
    let spad = SiteFetcher::new(
        Source::SpiritualPrinciple,
        config.spiritual_principle.url.as_str(),
        transport,
        config.spiritual_principle.retry_policy(),
    );
    for site in [&jft, &spad] {
        let policy = site.policy();
        info!(
            source = %site.source(),
            url = site.url(),
            attempts = policy.attempts,
            worst_case_secs = policy.worst_case().as_secs(),
            "Worst-case fetch time before fallback"
        );
    }

    let cache = Arc::new(ReadingCache::new(config.cache_expiry()));
    let store = Arc::new(SnapshotStore::new(&config.snapshot_dir));
    info!(
        archive = %dr.path().display(),
        snapshot_dir = %store.dir().display(),
        cache_expiry_secs = cache.expiry().as_secs(),
        deadline = ?config.deadline(),
        "Pipeline configured"
    );

    let aggregator = Aggregator::new(dr, jft, spad, Arc::clone(&cache), store);
    let aggregator = match config.deadline() {
        Some(deadline) => aggregator.with_deadline(deadline),
        None => aggregator,
    };

    let Some(interval_secs) = args.interval_secs else {
        run_once(&aggregator, &cache, &args).await;
        return Ok(());
    };

    info!(interval_secs, "Running on an interval; Ctrl-C to stop");
    let (aggregator, cache, args) = (&aggregator, &cache, &args);
    let runs = run_on_interval(
        Duration::from_secs(interval_secs),
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        },
        move || run_once(aggregator, cache, args),
    )
    .await;
    info!(runs, "Interrupted; shutting down");

    Ok(())
}

/// Call `run` every `period` until `shutdown` resolves.
///
/// `shutdown` is polled for the whole loop, so it also abandons a run that is
/// still in progress. Returns the number of completed runs.
async fn run_on_interval<F, Fut>(
    period: Duration,
    shutdown: impl Future<Output = ()>,
    mut run: F,
) -> u32
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    tokio::pin!(shutdown);
    let mut runs = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => return runs,
            _ = async {
                ticker.tick().await;
                run().await;
            } => runs += 1,
        }
    }
}

/// Assemble today's bundle and write both outputs.
///
/// Output failures are logged and do not stop a scheduled run.
async fn run_once<D, J, S>(aggregator: &Aggregator<D, J, S>, cache: &ReadingCache, args: &Cli)
where
    D: SourceAdapter,
    J: SourceAdapter,
    S: SourceAdapter,
{
    let start_time = std::time::Instant::now();
    let today = Local::now().date_naive();
    let bundle = aggregator.assemble(today).await;

    let (json_result, markdown_result) = futures::join!(
        json::write_bundle(&bundle, &args.json_output_dir),
        markdown::write_markdown(&bundle, &args.markdown_output_dir),
    );
    if let Err(e) = json_result {
        error!(error = %e, "Failed to write JSON bundle");
    }
    if let Err(e) = markdown_result {
        error!(error = %e, "Failed writing Markdown");
    }

    info!(
        %today,
        available = bundle.available(),
        cached = cache.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Run complete"
    );
}
