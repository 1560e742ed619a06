// Trait seams for the two remote collaborators.
//
// AdSearch: runs an ads library search and returns its raw records.
// PageMetadataSource: scrapes contact metadata for one page URL.
//
// ApifyClient implements both. Tests use MockAdSearch / MockPageSource.

use anyhow::Result;
use async_trait::async_trait;

use adlead_common::{AdleadError, PageMetadata, RawAdRecord};
use apify_client::{ApifyClient, ApifyError};

use crate::metadata::page_metadata;
use crate::search::AdSearchQuery;

#[async_trait]
pub trait AdSearch: Send + Sync {
    /// Run the search to completion. A search that yields no dataset is
    /// [`AdleadError::NoDataset`]; any other failure is [`AdleadError::Search`].
    async fn search_ads(&self, query: &AdSearchQuery) -> adlead_common::Result<Vec<RawAdRecord>>;
}

#[async_trait]
pub trait PageMetadataSource: Send + Sync {
    /// Scrape one page. An empty vec means the scraper found nothing.
    async fn page_metadata(&self, page_url: &str) -> Result<Vec<PageMetadata>>;
}

#[async_trait]
impl AdSearch for ApifyClient {
    async fn search_ads(&self, query: &AdSearchQuery) -> adlead_common::Result<Vec<RawAdRecord>> {
        let items = self
            .scrape_ads_library(&query.library_url(), query.max_results, query.active_status)
            .await
            .map_err(|e| match e {
                ApifyError::MissingDataset(_) => AdleadError::NoDataset,
                other => AdleadError::Search(other.to_string()),
            })?;

        Ok(items.into_iter().map(RawAdRecord::new).collect())
    }
}

#[async_trait]
impl PageMetadataSource for ApifyClient {
    async fn page_metadata(&self, page_url: &str) -> Result<Vec<PageMetadata>> {
        let items = self.scrape_facebook_page(page_url).await?;
        Ok(items.iter().map(page_metadata).collect())
    }
}
