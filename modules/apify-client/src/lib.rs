pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{ActiveStatus, AdsLibraryInput, PageScraperInput, RunData, StartUrl};

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for curious_coder/facebook-ads-library-scraper.
pub const ADS_LIBRARY_SCRAPER: &str = "curious_coder~facebook-ads-library-scraper";

/// Actor ID for apify/facebook-pages-scraper.
pub const FACEBOOK_PAGE_SCRAPER: &str = "apify~facebook-pages-scraper";

/// Seconds each run status request waits server-side for the run to finish.
pub const LONG_POLL_SECS: u64 = 60;

/// First retry waits this long; every further retry doubles it.
const BASE_BACKOFF: Duration = Duration::from_secs(1);

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    max_retries: u32,
    ads_actor: String,
    pages_actor: String,
    ads_run_timeout: Option<Duration>,
    pages_run_timeout: Option<Duration>,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            max_retries: 0,
            ads_actor: ADS_LIBRARY_SCRAPER.to_string(),
            pages_actor: FACEBOOK_PAGE_SCRAPER.to_string(),
            ads_run_timeout: None,
            pages_run_timeout: None,
        }
    }

    /// Client with a per-request timeout. Must exceed the [`LONG_POLL_SECS`] window
    /// used by [`ApifyClient::wait_for_run`].
    pub fn with_timeout(token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            ..Self::new(token)
        })
    }

    /// Retry transient failures up to `max_retries` times.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the actor IDs used for ad search and page scraping.
    pub fn actors(mut self, ads_actor: impl Into<String>, pages_actor: impl Into<String>) -> Self {
        self.ads_actor = ads_actor.into();
        self.pages_actor = pages_actor.into();
        self
    }

    /// Server-side time limits for ad search and page scrape runs. Apify
    /// aborts a run that exceeds its limit, so a caller giving up locally does
    /// not leave it running.
    pub fn run_timeouts(mut self, ads: Duration, pages: Duration) -> Self {
        self.ads_run_timeout = Some(ads);
        self.pages_run_timeout = Some(pages);
        self
    }

    /// Only idempotent requests are retried. A failed POST may still have
    /// started a run, and retrying it would start a second one.
    fn retries_for(&self, method: &Method) -> u32 {
        if method.is_idempotent() {
            self.max_retries
        } else {
            0
        }
    }

    /// Send a request, retrying transient failures with doubling backoff.
    /// Non-success statuses are turned into [`ApifyError::Api`].
    async fn send<F>(&self, method: Method, url: &str, decorate: F) -> Result<reqwest::Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let max_retries = self.retries_for(&method);
        let mut attempt = 0;
        loop {
            let request = decorate(self.client.request(method.clone(), url));
            let err = match request.bearer_auth(&self.token).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    ApifyError::Api {
                        status: status.as_u16(),
                        message: body,
                    }
                }
                Err(e) => ApifyError::from(e),
            };

            if !err.is_transient() || attempt >= max_retries {
                return Err(err);
            }

            let delay = backoff(attempt);
            tracing::warn!(
                attempt = attempt + 1,
                max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Apify request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Start an actor run, optionally capped server-side at `timeout`.
    /// Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(
        &self,
        actor_id: &str,
        input: &I,
        timeout: Option<Duration>,
    ) -> Result<RunData> {
        let url = run_url(actor_id, timeout);
        let resp = self.send(Method::POST, &url, |req| req.json(input)).await?;

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes, long-polling with `waitForFinish`. Callers
    /// bound the total wait.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!(
                "{}/actor-runs/{}?waitForFinish={}",
                BASE_URL, run_id, LONG_POLL_SECS
            );
            let resp = self.send(Method::GET, &url, |req| req).await?;

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed(api_resp.data.status));
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json&clean=true", BASE_URL, dataset_id);
        let resp = self.send(Method::GET, &url, |req| req).await?;

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Start a run, wait for it, and fetch its dataset as untyped JSON items.
    /// A completed run without a dataset id is an error.
    pub async fn run_actor<I: Serialize>(
        &self,
        actor_id: &str,
        input: &I,
        timeout: Option<Duration>,
    ) -> Result<Vec<serde_json::Value>> {
        let run = self.start_run(actor_id, input, timeout).await?;
        tracing::info!(actor_id, run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        let dataset_id = completed
            .dataset_id()
            .ok_or_else(|| ApifyError::MissingDataset(completed.id.clone()))?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id,
            "Run completed, fetching results"
        );

        self.get_dataset_items(dataset_id).await
    }

    /// Search the Facebook Ads Library end-to-end. Items are returned raw since
    /// the actor's output shape varies between records.
    pub async fn scrape_ads_library(
        &self,
        search_url: &str,
        count: u32,
        active_status: ActiveStatus,
    ) -> Result<Vec<serde_json::Value>> {
        tracing::info!(search_url, count, status = active_status.as_str(), "Starting ads library scrape");

        let input = AdsLibraryInput {
            urls: vec![StartUrl {
                url: search_url.to_string(),
            }],
            count,
            active_status,
        };

        let ads = self
            .run_actor(&self.ads_actor, &input, self.ads_run_timeout)
            .await?;
        tracing::info!(count = ads.len(), "Fetched ads");
        Ok(ads)
    }

    /// Scrape a Facebook page including its About section. Usually yields at
    /// most one item.
    pub async fn scrape_facebook_page(&self, page_url: &str) -> Result<Vec<serde_json::Value>> {
        tracing::info!(page_url, "Starting Facebook page scrape");

        let input = PageScraperInput {
            start_urls: vec![StartUrl {
                url: page_url.to_string(),
            }],
            scrape_about: true,
        };

        let pages = self
            .run_actor(&self.pages_actor, &input, self.pages_run_timeout)
            .await?;
        tracing::info!(page_url, count = pages.len(), "Fetched page metadata");
        Ok(pages)
    }
}

fn run_url(actor_id: &str, timeout: Option<Duration>) -> String {
    match timeout {
        Some(timeout) => format!(
            "{}/acts/{}/runs?timeout={}",
            BASE_URL,
            actor_id,
            timeout.as_secs().max(1)
        ),
        None => format!("{}/acts/{}/runs", BASE_URL, actor_id),
    }
}

fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.saturating_pow(attempt)
}
