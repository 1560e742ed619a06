use url::Url;

use adlead_common::config::{ActiveStatus, SearchConfig};
use adlead_common::{AdleadError, Result};

const ADS_LIBRARY_URL: &str = "https://www.facebook.com/ads/library/";

/// A validated ads library keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdSearchQuery {
    pub keyword: String,
    /// Two-letter, upper-case.
    pub country: String,
    pub max_results: u32,
    pub active_status: ActiveStatus,
}

impl AdSearchQuery {
    pub fn new(
        keyword: &str,
        country: &str,
        max_results: u32,
        active_status: ActiveStatus,
    ) -> Result<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AdleadError::InvalidSearch("keyword is required".to_string()));
        }

        let country = country.trim().to_uppercase();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AdleadError::InvalidSearch(format!(
                "country must be a 2-letter code, got '{country}'"
            )));
        }

        if max_results == 0 {
            return Err(AdleadError::InvalidSearch(
                "max_results must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            keyword: keyword.to_string(),
            country,
            max_results,
            active_status,
        })
    }

    /// Build from config defaults, overriding with whatever was given explicitly.
    pub fn from_config(
        keyword: &str,
        country: Option<&str>,
        max_results: Option<u32>,
        active_status: Option<ActiveStatus>,
        config: &SearchConfig,
    ) -> Result<Self> {
        Self::new(
            keyword,
            country.unwrap_or(&config.country),
            max_results.unwrap_or(config.max_results),
            active_status.unwrap_or(config.active_status),
        )
    }

    /// The ads library search page the scraper actor is pointed at.
    pub fn library_url(&self) -> String {
        let mut url = Url::parse(ADS_LIBRARY_URL).expect("static ads library URL is valid");
        url.query_pairs_mut()
            .append_pair("active_status", self.active_status.as_str())
            .append_pair("ad_type", "all")
            .append_pair("country", &self.country)
            .append_pair("q", &self.keyword)
            .append_pair("search_type", "keyword_unordered")
            .append_pair("media_type", "all");
        url.into()
    }
}
