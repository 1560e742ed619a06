//! Phase 1: raw ads library records → one clean row per page.

use tracing::{debug, warn};

use adlead_common::{CleanAdRow, FilterMode, RawAdRecord};

use crate::dedup::Deduplicator;
use crate::extract::{extract, ExtractedFields};
use crate::quality::check_text;

/// Why a raw record did not become a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    MissingIdentity,
    EmptyText,
    TooShort,
    Placeholder,
    NonWordText,
    Duplicate,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingIdentity => "missing_identity",
            SkipReason::EmptyText => "empty_text",
            SkipReason::TooShort => "too_short",
            SkipReason::Placeholder => "placeholder",
            SkipReason::NonWordText => "non_word_text",
            SkipReason::Duplicate => "duplicate",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A skipped input item: its position in the input, its identity if one was
/// found, and why it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped<R> {
    pub index: usize,
    pub key: Option<String>,
    pub reason: R,
}

#[derive(Debug, Default)]
pub struct CleanOutcome {
    pub rows: Vec<CleanAdRow>,
    pub skipped: Vec<Skipped<SkipReason>>,
    /// Malformed-but-tolerated fields seen while extracting.
    pub warnings: usize,
}

fn to_row(fields: &ExtractedFields, mode: FilterMode) -> Result<CleanAdRow, SkipReason> {
    let page_name = fields.identity.clone().ok_or(SkipReason::MissingIdentity)?;
    let ad_text = check_text(&fields.body_text, mode)?;
    // A present identity always yields a URL, direct or synthesized.
    let page_url = fields.contact_url.clone().unwrap_or_default();

    Ok(CleanAdRow {
        page_name,
        page_url,
        ad_text,
    })
}

/// Clean and deduplicate raw records by page name, keeping the first
/// acceptable occurrence of each page in input order.
pub fn clean(records: &[RawAdRecord], mode: FilterMode) -> CleanOutcome {
    let mut dedup = Deduplicator::new();
    let mut outcome = CleanOutcome::default();

    for (index, record) in records.iter().enumerate() {
        let fields = extract(record);
        for warning in &fields.warnings {
            warn!(
                index,
                page = fields.identity.as_deref().unwrap_or("<unknown>"),
                %warning,
                "Malformed ad record field, treating as absent"
            );
        }
        outcome.warnings += fields.warnings.len();

        let result = to_row(&fields, mode).and_then(|row| {
            if dedup.admit(&row.page_name) {
                Ok(row)
            } else {
                Err(SkipReason::Duplicate)
            }
        });

        match result {
            Ok(row) => outcome.rows.push(row),
            Err(reason) => {
                debug!(index, page = ?fields.identity, %reason, "Skipping ad record");
                outcome.skipped.push(Skipped {
                    index,
                    key: fields.identity,
                    reason,
                });
            }
        }
    }

    outcome
}
