use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// A start URL entry for actor inputs.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrl {
    pub url: String,
}

/// Which ads the library scraper should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveStatus {
    #[default]
    Active,
    All,
}

impl ActiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveStatus::Active => "active",
            ActiveStatus::All => "all",
        }
    }
}

/// Input for the curious_coder/facebook-ads-library-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct AdsLibraryInput {
    pub urls: Vec<StartUrl>,
    pub count: u32,
    #[serde(rename = "scrapePageAds.activeStatus")]
    pub active_status: ActiveStatus,
}

/// Input for the facebook page scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct PageScraperInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
    /// Also scrape the page's About section (contact details live there).
    #[serde(rename = "scrapeAbout")]
    pub scrape_about: bool,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId", default)]
    pub default_dataset_id: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunData {
    /// The run's dataset id, if the backend reported a non-empty one.
    pub fn dataset_id(&self) -> Option<&str> {
        self.default_dataset_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}
