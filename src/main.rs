//! # AI Impact Brief
//!
//! A daily batch job that reads AI-industry RSS/Atom feeds, picks three
//! diverse stories, and publishes them as a small JSON brief for Japanese
//! readers.
//!
//! ## Usage
//!
//! ```sh
//! ai_impact_brief -o public/today.json -a public/archive
//! ```
//!
//! ## Architecture
//!
//! The run is a straight pipeline:
//! 1. **Collecting**: Fetch every feed, keep relevant entries, dedup by canonical URL
//! 2. **Selecting**: One story per source, covering market, policy and tech when possible
//! 3. **Enriching**: Structured analysis from a chat model, or a local fallback template
//! 4. **Output**: Write `today.json` and `archive/<date>.json`

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod enrich;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod utils;

use cli::Cli;
use enrich::analyst::OpenAiAnalyst;
use feeds::fetch::HttpFeedSource;
use outputs::json;
use pipeline::collect::{FEED_PACING, collect_candidates};
use pipeline::select::pick_diverse;
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

    let start_time = std::time::Instant::now();
    info!("ai_impact_brief starting up");

    let args = Cli::parse();
    debug!(
        output_path = %args.output_path.display(),
        archive_dir = %args.archive_dir.display(),
        feeds_file = ?args.feeds,
        "Parsed CLI arguments"
    );

    let feeds = feeds::load_feeds(args.feeds.as_deref()).await?;
    info!(count = feeds.len(), "Loaded feed list");

    // Early check: both output locations must be writable
    let output_dir = args
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    for dir in [output_dir, args.archive_dir.as_path()] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Collect and select ----
    let source = HttpFeedSource::new()?;
    let candidates = collect_candidates(&source, &feeds, FEED_PACING).await;
    let selection = pick_diverse(&candidates);
    info!(
        candidates = candidates.len(),
        selected = selection.len(),
        "Selection complete"
    );

    // ---- Enrich ----
    let analyst = match args.analysis_key() {
        Some(key) => match OpenAiAnalyst::new(key, &args.openai_model, &args.openai_base_url) {
            Ok(a) => {
                info!(model = %a.model(), "Structured analysis enabled");
                Some(a)
            }
            Err(e) => {
                warn!(error = %e, "Could not build analysis client; using fallback template");
                None
            }
        },
        None => None,
    };
    let enrichment = enrich::enrich(analyst.as_ref(), &selection, Utc::now()).await;
    info!(
        structured = enrichment.is_structured(),
        items = enrichment.payload().items.len(),
        "Enrichment finished"
    );
    let payload = enrichment.into_payload();

    // ---- Output ----
    let written = match json::write_payload(&payload, &args.output_path, &args.archive_dir).await {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "Failed to write brief");
            return Err(e);
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        primary = %written.primary.display(),
        archive = %written.archive.display(),
        version = %payload.version,
        sources = %payload.sources.join(", "),
        items = payload.items.len(),
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
