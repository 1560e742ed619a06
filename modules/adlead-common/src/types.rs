use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Raw input ---

/// One item from the ads library dataset, before normalization.
///
/// The actor's output has no fixed schema: a field may appear under
/// alternative keys, be nested, be null, or have an unexpected type. Items that
/// are not JSON objects are kept as-is and simply expose no fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAdRecord(Value);

impl RawAdRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a top-level field. `None` for missing keys and non-object records.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object()?.get(key)
    }
}

impl From<Value> for RawAdRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// --- Phase 1 output ---

/// A deduplicated page found through the ads library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanAdRow {
    pub page_name: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub ad_text: String,
}

// --- Phase 2 ---

/// Contact metadata scraped from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub website: String,
    pub email: String,
    pub phone: String,
    pub category: String,
    pub bio: String,
    pub address: String,
}

/// A Phase 1 row with contact metadata merged in.
///
/// The extended fields are always carried; whether they are persisted depends
/// on the configured [`FieldSet`](crate::config::FieldSet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub page_name: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub ad_text: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub address: String,
}

impl EnrichedRow {
    pub fn merge(row: CleanAdRow, meta: PageMetadata) -> Self {
        Self {
            page_name: row.page_name,
            page_url: row.page_url,
            ad_text: row.ad_text,
            website: meta.website,
            email: meta.email,
            phone: meta.phone,
            category: meta.category,
            bio: meta.bio,
            address: meta.address,
        }
    }
}
