// Test mocks for the two collaborator traits.
//
// - MockAdSearch (AdSearch): fixed records, or a NoDataset / search failure,
//   with an optional delay
// - MockPageSource (PageMetadataSource): HashMap-based URL→response, with
//   optional per-URL delays and a log of requested URLs

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use adlead_common::{AdleadError, PageMetadata, RawAdRecord};

use crate::search::AdSearchQuery;
use crate::traits::{AdSearch, PageMetadataSource};

// ---------------------------------------------------------------------------
// MockAdSearch
// ---------------------------------------------------------------------------

enum SearchResponse {
    Records(Vec<serde_json::Value>),
    NoDataset,
    Failure(String),
}

/// Returns the same response for every query and remembers the queries seen.
pub struct MockAdSearch {
    response: SearchResponse,
    delay: Option<Duration>,
    queries: Mutex<Vec<AdSearchQuery>>,
}

impl MockAdSearch {
    pub fn with_records(records: Vec<serde_json::Value>) -> Self {
        Self::from_response(SearchResponse::Records(records))
    }

    pub fn no_dataset() -> Self {
        Self::from_response(SearchResponse::NoDataset)
    }

    pub fn failing(message: &str) -> Self {
        Self::from_response(SearchResponse::Failure(message.to_string()))
    }

    fn from_response(response: SearchResponse) -> Self {
        Self {
            response,
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<AdSearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdSearch for MockAdSearch {
    async fn search_ads(&self, query: &AdSearchQuery) -> adlead_common::Result<Vec<RawAdRecord>> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            SearchResponse::Records(records) => {
                Ok(records.iter().cloned().map(RawAdRecord::new).collect())
            }
            SearchResponse::NoDataset => Err(AdleadError::NoDataset),
            SearchResponse::Failure(message) => Err(AdleadError::Search(message.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// MockPageSource
// ---------------------------------------------------------------------------

/// HashMap-based page scraper. Returns `Err` for unregistered URLs.
/// Builder pattern: `.on_page()`, `.on_error()`, `.with_delay()`.
pub struct MockPageSource {
    pages: HashMap<String, Result<Vec<PageMetadata>, String>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPageSource {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(mut self, url: &str, items: Vec<PageMetadata>) -> Self {
        self.pages.insert(url.to_string(), Ok(items));
        self
    }

    pub fn on_error(mut self, url: &str, message: &str) -> Self {
        self.pages.insert(url.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageMetadataSource for MockPageSource {
    async fn page_metadata(&self, page_url: &str) -> Result<Vec<PageMetadata>> {
        self.calls.lock().unwrap().push(page_url.to_string());

        if let Some(delay) = self.delays.get(page_url) {
            tokio::time::sleep(*delay).await;
        }

        match self.pages.get(page_url) {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(message)) => Err(anyhow!(message.clone())),
            None => bail!("MockPageSource: no response registered for {page_url}"),
        }
    }
}
