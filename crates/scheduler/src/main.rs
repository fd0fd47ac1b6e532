//! Autonomous promo scheduler.
//!
//! Posts a new promo every interval (default 1h17m) until Ctrl-C. A Ctrl-C
//! during a run aborts any video generation, lets the post go out, then exits.
//!
//! ```bash
//! promo-scheduler            # run forever
//! promo-scheduler --once     # single post, then exit
//! LOG_FORMAT=json RUST_LOG=orchestrator=debug promo-scheduler
//! ```

mod ideas;

use std::env;
use std::time::Duration;

use clap::Parser;
use orchestrator::PublishOrchestrator;
use product_cache::{product_context, FirecrawlScraper, ProductCache};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::ideas::{post_instruction, IdeaPool};

/// Default pause between runs (1 hour 17 minutes).
const DEFAULT_INTERVAL_SECS: u64 = 60 * 60 + 17 * 60;

/// Characters of the analysis text logged per run.
const ANALYSIS_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Parser)]
#[command(name = "promo-scheduler")]
#[command(about = "Post promo content on a fixed interval")]
struct Args {
    /// Run a single post and exit
    #[arg(long)]
    once: bool,

    /// Seconds between runs. Falls back to SCHEDULE_INTERVAL_SECS env.
    #[arg(long)]
    interval_secs: Option<u64>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn interval(args: &Args) -> Duration {
    let secs = args
        .interval_secs
        .or_else(|| env::var("SCHEDULE_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()))
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_INTERVAL_SECS);
    Duration::from_secs(secs)
}

/// Rotation plus product titles, when a scraper is configured.
async fn idea_pool() -> IdeaPool {
    let pool = IdeaPool::default();

    let scraper = match FirecrawlScraper::from_env() {
        Some(Ok(scraper)) => scraper,
        Some(Err(e)) => {
            warn!("Product scraping disabled: {}", e);
            return pool;
        }
        None => return pool,
    };

    match ProductCache::from_env().get_or_refresh(&scraper).await {
        Ok(products) => {
            debug!("{}", product_context(&products));
            pool.with_products(&products)
        }
        Err(e) => {
            warn!("Product cache unavailable: {}", e);
            pool
        }
    }
}

async fn run_once(orchestrator: &PublishOrchestrator) {
    let pool = idea_pool().await;
    let idea = pool.pick(&mut rand::thread_rng()).to_string();
    let query = post_instruction(&idea);

    info!("Running: {}", query);
    let result = orchestrator.publish(&idea).await;
    let analysis: String = result
        .analysis(&query)
        .chars()
        .take(ANALYSIS_PREVIEW_CHARS)
        .collect();

    if result.success {
        info!("Posted successfully\n{}...", analysis);
    } else {
        error!("Run failed\n{}...", analysis);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    let interval = interval(&args);

    let orchestrator = PublishOrchestrator::from_env()?;
    if !orchestrator.is_configured() {
        warn!("Credentials missing; every run will fail until they are set");
    }

    info!("Promo scheduler started, posting every {} minutes", interval.as_secs() / 60);

    let cancel = orchestrator.cancellation_token();

    loop {
        let run = run_once(&orchestrator);
        tokio::pin!(run);

        let interrupted = tokio::select! {
            _ = &mut run => false,
            _ = tokio::signal::ctrl_c() => true,
        };

        if interrupted {
            info!("Interrupted, cancelling media generation and finishing the current post");
            cancel.cancel();
            run.await;
            break;
        }

        if args.once {
            break;
        }

        info!("Sleeping for {} minutes", interval.as_secs() / 60);
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
