//! Phase 2: attach contact metadata to each unique page.
//!
//! Dedup admission runs sequentially over the input before any lookup starts,
//! so the seen-set needs no locking. Lookups then run through
//! `buffered(concurrency)`, which yields in input order regardless of which
//! lookup finishes first. A failed, empty or timed-out lookup drops its row
//! and never affects the others.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use adlead_common::config::EnrichConfig;
use adlead_common::{CleanAdRow, DedupKey, EnrichedRow};

use crate::clean::Skipped;
use crate::dedup::Deduplicator;
use crate::extract::page_url_for;
use crate::traits::PageMetadataSource;

/// Why a row was left out of the enriched output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichSkip {
    /// Neither a page name nor a page URL to look up.
    MissingIdentity,
    Duplicate,
    /// The scraper returned no items for the page.
    NoData,
    Failed(String),
    TimedOut,
}

impl EnrichSkip {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichSkip::MissingIdentity => "missing_identity",
            EnrichSkip::Duplicate => "duplicate",
            EnrichSkip::NoData => "no_data",
            EnrichSkip::Failed(_) => "failed",
            EnrichSkip::TimedOut => "timed_out",
        }
    }
}

impl std::fmt::Display for EnrichSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichSkip::Failed(message) => write!(f, "failed: {message}"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub dedup_key: DedupKey,
    /// Lookups in flight at once. 1 is fully sequential.
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self::from(&EnrichConfig::default())
    }
}

impl From<&EnrichConfig> for EnrichOptions {
    fn from(config: &EnrichConfig) -> Self {
        Self {
            dedup_key: config.dedup_key,
            concurrency: config.concurrency.max(1),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[derive(Debug, Default)]
pub struct EnrichOutcome {
    pub rows: Vec<EnrichedRow>,
    pub skipped: Vec<Skipped<EnrichSkip>>,
}

/// URL to scrape for a row: its stored page URL, else one synthesized from
/// the page name.
pub fn target_url(row: &CleanAdRow) -> Option<String> {
    let url = row.page_url.trim();
    if !url.is_empty() {
        return Some(url.to_string());
    }
    let name = row.page_name.trim();
    (!name.is_empty()).then(|| page_url_for(name))
}

/// The value a row is deduplicated on.
pub fn dedup_key(row: &CleanAdRow, key: DedupKey) -> Option<String> {
    match key {
        DedupKey::PageName => {
            let name = row.page_name.trim();
            (!name.is_empty()).then(|| name.to_string())
        }
        DedupKey::PageUrl => target_url(row),
    }
}

pub async fn enrich<S>(source: &S, rows: Vec<CleanAdRow>, options: &EnrichOptions) -> EnrichOutcome
where
    S: PageMetadataSource + ?Sized,
{
    let mut outcome = EnrichOutcome::default();
    let mut dedup = Deduplicator::new();
    let mut pending = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let Some(key) = dedup_key(&row, options.dedup_key) else {
            warn!(index, "Row has no page name or URL, skipping enrichment");
            outcome.skipped.push(Skipped {
                index,
                key: None,
                reason: EnrichSkip::MissingIdentity,
            });
            continue;
        };
        if !dedup.admit(&key) {
            outcome.skipped.push(Skipped {
                index,
                key: Some(key),
                reason: EnrichSkip::Duplicate,
            });
            continue;
        }
        // Every admitted row has a name or URL, so a target URL exists.
        let url = target_url(&row).unwrap_or_default();
        pending.push((index, key, url, row));
    }

    info!(
        pages = pending.len(),
        concurrency = options.concurrency,
        "Enriching pages"
    );

    let results: Vec<_> = stream::iter(pending.into_iter().map(|(index, key, url, row)| {
        async move {
            let result = lookup(source, &url, options.timeout).await;
            (index, key, url, row, result)
        }
    }))
    .buffered(options.concurrency)
    .collect()
    .await;

    for (index, key, url, row, result) in results {
        match result {
            Ok(meta) => outcome.rows.push(EnrichedRow::merge(row, meta)),
            Err(reason) => {
                warn!(index, page_url = url.as_str(), %reason, "Page not enriched");
                outcome.skipped.push(Skipped {
                    index,
                    key: Some(key),
                    reason,
                });
            }
        }
    }

    // Duplicates were recorded before lookups; restore input order.
    outcome.skipped.sort_by_key(|s| s.index);
    outcome
}

async fn lookup<S>(
    source: &S,
    url: &str,
    timeout: Duration,
) -> Result<adlead_common::PageMetadata, EnrichSkip>
where
    S: PageMetadataSource + ?Sized,
{
    match tokio::time::timeout(timeout, source.page_metadata(url)).await {
        Err(_) => Err(EnrichSkip::TimedOut),
        Ok(Err(e)) => Err(EnrichSkip::Failed(e.to_string())),
        Ok(Ok(items)) => items.into_iter().next().ok_or(EnrichSkip::NoData),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPageSource;
    use adlead_common::PageMetadata;

    fn row(name: &str, url: &str) -> CleanAdRow {
        CleanAdRow {
            page_name: name.to_string(),
            page_url: url.to_string(),
            ad_text: "Seasonal offer on everything in store".to_string(),
        }
    }

    fn contact(email: &str) -> PageMetadata {
        PageMetadata {
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn target_url_prefers_stored_url() {
        assert_eq!(
            target_url(&row("Acme", "https://www.facebook.com/acme.official")).as_deref(),
            Some("https://www.facebook.com/acme.official")
        );
        assert_eq!(
            target_url(&row("Acme Tools", "")).as_deref(),
            Some("https://www.facebook.com/AcmeTools")
        );
        assert_eq!(target_url(&row(" ", "")), None);
    }

    #[test]
    fn dedup_key_follows_mode() {
        let r = row("Acme", "https://www.facebook.com/acme.official");
        assert_eq!(dedup_key(&r, DedupKey::PageName).as_deref(), Some("Acme"));
        assert_eq!(
            dedup_key(&r, DedupKey::PageUrl).as_deref(),
            Some("https://www.facebook.com/acme.official")
        );
        assert_eq!(dedup_key(&row("", "https://x"), DedupKey::PageName), None);
    }

    #[tokio::test]
    async fn merges_first_metadata_record() {
        let source = MockPageSource::new().on_page(
            "https://www.facebook.com/Acme",
            vec![contact("first@acme.example"), contact("second@acme.example")],
        );

        let outcome = enrich(
            &source,
            vec![row("Acme", "https://www.facebook.com/Acme")],
            &EnrichOptions::default(),
        )
        .await;

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].email, "first@acme.example");
        assert_eq!(outcome.rows[0].website, "");
        assert_eq!(outcome.rows[0].phone, "");
        assert_eq!(
            outcome.rows[0].ad_text,
            "Seasonal offer on everything in store"
        );
    }

    #[tokio::test]
    async fn failures_and_empty_results_drop_only_their_row() {
        let source = MockPageSource::new()
            .on_error("https://www.facebook.com/Broken", "actor crashed")
            .on_page("https://www.facebook.com/Empty", vec![])
            .on_page("https://www.facebook.com/Good", vec![contact("hi@good.example")]);

        let outcome = enrich(
            &source,
            vec![
                row("Broken", "https://www.facebook.com/Broken"),
                row("Empty", "https://www.facebook.com/Empty"),
                row("Good", "https://www.facebook.com/Good"),
            ],
            &EnrichOptions::default(),
        )
        .await;

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].page_name, "Good");

        let reasons: Vec<_> = outcome.skipped.iter().map(|s| s.reason.as_str()).collect();
        assert_eq!(reasons, vec!["failed", "no_data"]);
        assert_eq!(
            outcome.skipped[0].reason,
            EnrichSkip::Failed("actor crashed".to_string())
        );
    }

    #[tokio::test]
    async fn duplicates_are_looked_up_once() {
        let source = MockPageSource::new()
            .on_page("https://www.facebook.com/Acme", vec![contact("a@acme.example")]);

        let outcome = enrich(
            &source,
            vec![
                row("Acme", "https://www.facebook.com/Acme"),
                row("Acme Again", "https://www.facebook.com/Acme"),
            ],
            &EnrichOptions::default(),
        )
        .await;

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.skipped[0].reason, EnrichSkip::Duplicate);
        assert_eq!(outcome.skipped[0].index, 1);
        assert_eq!(source.calls(), vec!["https://www.facebook.com/Acme"]);
    }

    #[tokio::test]
    async fn page_name_mode_treats_same_name_as_duplicate() {
        let source = MockPageSource::new()
            .on_page("https://www.facebook.com/one", vec![contact("1@x.example")])
            .on_page("https://www.facebook.com/two", vec![contact("2@x.example")]);
        let options = EnrichOptions {
            dedup_key: DedupKey::PageName,
            ..Default::default()
        };

        let outcome = enrich(
            &source,
            vec![
                row("Acme", "https://www.facebook.com/one"),
                row("Acme", "https://www.facebook.com/two"),
            ],
            &options,
        )
        .await;

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].email, "1@x.example");
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let source = MockPageSource::new()
            .on_page("https://www.facebook.com/Slow", vec![contact("s@x.example")])
            .with_delay("https://www.facebook.com/Slow", Duration::from_secs(5))
            .on_page("https://www.facebook.com/Fast", vec![contact("f@x.example")]);
        let options = EnrichOptions {
            timeout: Duration::from_millis(50),
            ..Default::default()
        };

        let outcome = enrich(
            &source,
            vec![
                row("Slow", "https://www.facebook.com/Slow"),
                row("Fast", "https://www.facebook.com/Fast"),
            ],
            &options,
        )
        .await;

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].page_name, "Fast");
        assert_eq!(outcome.skipped[0].reason, EnrichSkip::TimedOut);
    }

    #[tokio::test]
    async fn concurrent_lookups_keep_input_order() {
        let source = MockPageSource::new()
            .on_page("https://www.facebook.com/A", vec![contact("a@x.example")])
            .with_delay("https://www.facebook.com/A", Duration::from_millis(80))
            .on_page("https://www.facebook.com/B", vec![contact("b@x.example")])
            .with_delay("https://www.facebook.com/B", Duration::from_millis(40))
            .on_page("https://www.facebook.com/C", vec![contact("c@x.example")]);
        let options = EnrichOptions {
            concurrency: 3,
            ..Default::default()
        };

        let outcome = enrich(
            &source,
            vec![
                row("A", "https://www.facebook.com/A"),
                row("B", "https://www.facebook.com/B"),
                row("C", "https://www.facebook.com/C"),
            ],
            &options,
        )
        .await;

        let names: Vec<_> = outcome.rows.iter().map(|r| r.page_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn rows_without_identity_are_skipped() {
        let source = MockPageSource::new();

        let outcome = enrich(&source, vec![row("", "")], &EnrichOptions::default()).await;

        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.skipped[0].reason, EnrichSkip::MissingIdentity);
        assert!(source.calls().is_empty());
    }
}
