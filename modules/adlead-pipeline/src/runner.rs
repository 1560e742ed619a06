//! Phase runners: fetch → transform → persist, with stats.
//!
//! Fatal conditions (search failure or timeout, no dataset, unreadable input, storage
//! errors) return `Err` and nothing is written. Per-record and per-page
//! problems are logged, counted, and never stop the run.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use adlead_common::{AdleadError, CleanAdRow, FileConfig, Result};

use crate::clean::{clean, CleanOutcome};
use crate::enrich::{enrich, EnrichOptions, EnrichOutcome};
use crate::search::AdSearchQuery;
use crate::stats::PhaseStats;
use crate::storage;
use crate::traits::{AdSearch, PageMetadataSource};

pub struct Phase1Report {
    pub outcome: CleanOutcome,
    pub stats: PhaseStats,
}

pub struct Phase2Report {
    pub outcome: EnrichOutcome,
    pub stats: PhaseStats,
}

/// Search the ads library, clean the results, and write the cleaned table.
pub async fn run_phase1<S>(search: &S, query: &AdSearchQuery, config: &FileConfig) -> Result<Phase1Report>
where
    S: AdSearch + ?Sized,
{
    info!(
        keyword = query.keyword.as_str(),
        country = query.country.as_str(),
        max_results = query.max_results,
        url = %query.library_url(),
        "Phase 1: searching ads library"
    );

    let limit = Duration::from_secs(config.search.timeout_secs);
    let records = tokio::time::timeout(limit, search.search_ads(query))
        .await
        .map_err(|_| {
            AdleadError::Search(format!(
                "no result within {}s",
                config.search.timeout_secs
            ))
        })??;
    info!(count = records.len(), "Retrieved raw ads");

    let outcome = clean(&records, config.pipeline.filter_mode);
    info!(
        pages = outcome.rows.len(),
        skipped = outcome.skipped.len(),
        mode = ?config.pipeline.filter_mode,
        "Cleaned to unique pages"
    );

    let path = config.storage.cleaned_path();
    let written = storage::write_clean(&path, &outcome.rows, config.pipeline.empty_output)?;

    let mut stats = PhaseStats::new("Phase 1");
    stats.input = records.len();
    stats.kept = outcome.rows.len();
    stats.warnings = outcome.warnings;
    for skip in &outcome.skipped {
        stats.record_skip(skip.reason.as_str());
    }
    stats.output = written.then_some(path);

    Ok(Phase1Report { outcome, stats })
}

/// Enrich cleaned rows with page metadata and write the enriched table.
pub async fn run_phase2<S>(source: &S, rows: Vec<CleanAdRow>, config: &FileConfig) -> Result<Phase2Report>
where
    S: PageMetadataSource + ?Sized,
{
    let input = rows.len();
    let options = EnrichOptions::from(&config.enrich);
    info!(rows = input, dedup_key = ?options.dedup_key, "Phase 2: enriching pages");

    let outcome = enrich(source, rows, &options).await;
    info!(
        enriched = outcome.rows.len(),
        skipped = outcome.skipped.len(),
        "Enrichment finished"
    );

    let path = config.storage.enriched_path();
    let written = storage::write_enriched(
        &path,
        &outcome.rows,
        config.enrich.fields,
        config.enrich.empty_output,
    )?;

    let mut stats = PhaseStats::new("Phase 2");
    stats.input = input;
    stats.kept = outcome.rows.len();
    for skip in &outcome.skipped {
        stats.record_skip(skip.reason.as_str());
    }
    stats.output = written.then_some(path);

    Ok(Phase2Report { outcome, stats })
}

/// Rows for phase 2: the given file, else the phase 1 output on disk.
pub fn load_phase2_input(input: Option<&Path>, config: &FileConfig) -> Result<Vec<CleanAdRow>> {
    let path = match input {
        Some(path) => path.to_path_buf(),
        None => config.storage.cleaned_path(),
    };
    if !path.exists() {
        return Err(AdleadError::NoInput(path));
    }

    let rows = storage::read_clean(&path)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded phase 2 input");
    Ok(rows)
}

/// Phase 1 followed by phase 2 on its in-memory rows. An empty phase 1
/// result stops the run before any enrichment.
pub async fn run_both<A, P>(
    search: &A,
    source: &P,
    query: &AdSearchQuery,
    config: &FileConfig,
) -> Result<(Phase1Report, Phase2Report)>
where
    A: AdSearch + ?Sized,
    P: PageMetadataSource + ?Sized,
{
    let phase1 = run_phase1(search, query, config).await?;
    if phase1.outcome.rows.is_empty() {
        return Err(AdleadError::NoRows);
    }

    let rows = phase1.outcome.rows.clone();
    let phase2 = run_phase2(source, rows, config).await?;
    Ok((phase1, phase2))
}
