use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AdleadError, Result};

pub use apify_client::ActiveStatus;

const APIFY_TOKEN_VAR: &str = "APIFY_API_TOKEN";

// --- Secrets (env) ---

/// Secrets loaded from the environment (and `.env` if present).
/// Everything else lives in the TOML [`FileConfig`].
#[derive(Clone)]
pub struct AppConfig {
    pub apify_api_token: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("apify_api_token", &preview(&self.apify_api_token))
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from an arbitrary variable source. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let apify_api_token = lookup(APIFY_TOKEN_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(AdleadError::MissingCredential(APIFY_TOKEN_VAR))?;

        Ok(Self { apify_api_token })
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  {}: {}", APIFY_TOKEN_VAR, preview(&self.apify_api_token));
    }
}

fn preview(val: &str) -> String {
    let n = val.chars().take(5).map(char::len_utf8).sum::<usize>();
    format!("{}...({} chars)", &val[..n], val.chars().count())
}

// --- Pipeline modes ---

/// How strictly ad text is filtered in phase 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Keep every identified page; empty text becomes "N/A".
    Lenient,
    /// Drop empty, short, templated, or symbol-only text.
    #[default]
    Strict,
}

/// What to do with the phase output file when a run produced no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyOutput {
    /// Leave any existing file untouched.
    #[default]
    Skip,
    /// Write a header-only file over the previous one.
    Overwrite,
}

/// Which column identifies a page during enrichment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    PageName,
    #[default]
    PageUrl,
}

/// Which metadata columns enrichment persists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSet {
    /// website, email, phone
    #[default]
    Contact,
    /// contact fields plus category, bio, address
    Extended,
}

// --- File config (TOML) ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    pub enrich: EnrichConfig,
    pub storage: StorageConfig,
    pub apify: ApifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub country: String,
    pub max_results: u32,
    pub active_status: ActiveStatus,
    /// Upper bound on one ads library search, start to last dataset item.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            country: "US".to_string(),
            max_results: 50,
            active_status: ActiveStatus::Active,
            timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub filter_mode: FilterMode,
    pub empty_output: EmptyOutput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub dedup_key: DedupKey,
    pub fields: FieldSet,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub empty_output: EmptyOutput,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            dedup_key: DedupKey::PageUrl,
            fields: FieldSet::Contact,
            concurrency: 1,
            timeout_secs: 120,
            empty_output: EmptyOutput::Skip,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub results_dir: PathBuf,
    pub cleaned_file: String,
    pub enriched_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            cleaned_file: "ads_cleaned.csv".to_string(),
            enriched_file: "enriched_pages.csv".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn cleaned_path(&self) -> PathBuf {
        self.results_dir.join(&self.cleaned_file)
    }

    pub fn enriched_path(&self) -> PathBuf {
        self.results_dir.join(&self.enriched_file)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApifyConfig {
    pub ads_actor: String,
    pub pages_actor: String,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for ApifyConfig {
    fn default() -> Self {
        Self {
            ads_actor: apify_client::ADS_LIBRARY_SCRAPER.to_string(),
            pages_actor: apify_client::FACEBOOK_PAGE_SCRAPER.to_string(),
            max_retries: 2,
            request_timeout_secs: 300,
        }
    }
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| AdleadError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.search.timeout_secs == 0 {
            return Err(AdleadError::Config(
                "search.timeout_secs must be at least 1".to_string(),
            ));
        }
        // Run polling holds each request open for up to this long.
        if self.apify.request_timeout_secs <= apify_client::LONG_POLL_SECS {
            return Err(AdleadError::Config(format!(
                "apify.request_timeout_secs must exceed the {}s run poll window",
                apify_client::LONG_POLL_SECS
            )));
        }
        if self.enrich.concurrency == 0 {
            return Err(AdleadError::Config(
                "enrich.concurrency must be at least 1".to_string(),
            ));
        }
        if self.enrich.timeout_secs == 0 {
            return Err(AdleadError::Config(
                "enrich.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.storage.cleaned_file == self.storage.enriched_file {
            return Err(AdleadError::Config(
                "storage.cleaned_file and storage.enriched_file must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AdleadError::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    FileConfig::parse(&content)
        .map_err(|e| AdleadError::Config(format!("{}: {e}", path.display())))
}

/// Load the config file if it exists, otherwise fall back to defaults.
pub fn load_config_or_default(path: &Path) -> Result<FileConfig> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        Ok(FileConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_fatal() {
        let err = AppConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, AdleadError::MissingCredential("APIFY_API_TOKEN")));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let err = AppConfig::from_lookup(|_| Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, AdleadError::MissingCredential(_)));
    }

    #[test]
    fn token_is_read_and_redacted_in_debug() {
        let config = AppConfig::from_lookup(|key| {
            (key == "APIFY_API_TOKEN").then(|| "apify_api_secret123".to_string())
        })
        .unwrap();
        assert_eq!(config.apify_api_token, "apify_api_secret123");

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("apify...(19 chars)"));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = FileConfig::parse("").unwrap();
        assert_eq!(config.search.country, "US");
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.search.active_status, ActiveStatus::Active);
        assert_eq!(config.pipeline.filter_mode, FilterMode::Strict);
        assert_eq!(config.pipeline.empty_output, EmptyOutput::Skip);
        assert_eq!(config.enrich.dedup_key, DedupKey::PageUrl);
        assert_eq!(config.enrich.fields, FieldSet::Contact);
        assert_eq!(config.enrich.concurrency, 1);
        assert_eq!(
            config.storage.cleaned_path(),
            PathBuf::from("results").join("ads_cleaned.csv")
        );
        assert_eq!(
            config.storage.enriched_path(),
            PathBuf::from("results").join("enriched_pages.csv")
        );
        assert_eq!(config.apify.ads_actor, apify_client::ADS_LIBRARY_SCRAPER);
    }

    #[test]
    fn sections_override_defaults() {
        let config = FileConfig::parse(
            r#"
            [search]
            country = "GB"
            active_status = "all"

            [pipeline]
            filter_mode = "lenient"
            empty_output = "overwrite"

            [enrich]
            dedup_key = "page_name"
            fields = "extended"
            concurrency = 4

            [storage]
            results_dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.country, "GB");
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.search.active_status, ActiveStatus::All);
        assert_eq!(config.pipeline.filter_mode, FilterMode::Lenient);
        assert_eq!(config.pipeline.empty_output, EmptyOutput::Overwrite);
        assert_eq!(config.enrich.dedup_key, DedupKey::PageName);
        assert_eq!(config.enrich.fields, FieldSet::Extended);
        assert_eq!(config.enrich.concurrency, 4);
        assert_eq!(config.enrich.timeout_secs, 120);
        assert_eq!(
            config.storage.cleaned_path(),
            PathBuf::from("out").join("ads_cleaned.csv")
        );
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = FileConfig::parse("[scraper]\nkey = 1\n").unwrap_err();
        assert!(matches!(err, AdleadError::Config(_)));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = FileConfig::parse("[enrich]\nconcurrency = 0\n").unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn request_timeout_must_outlast_run_polling() {
        for secs in [10, 60] {
            let err = FileConfig::parse(&format!("[apify]\nrequest_timeout_secs = {secs}\n"))
                .unwrap_err();
            assert!(err.to_string().contains("request_timeout_secs"));
        }
        let config = FileConfig::parse("[apify]\nrequest_timeout_secs = 61\n").unwrap();
        assert_eq!(config.apify.request_timeout_secs, 61);
    }

    #[test]
    fn search_timeout_defaults_and_rejects_zero() {
        assert_eq!(FileConfig::default().search.timeout_secs, 600);
        let err = FileConfig::parse("[search]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("search.timeout_secs"));
    }

    #[test]
    fn missing_default_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(&dir.path().join("adlead.toml")).unwrap();
        assert_eq!(config.search.country, "US");
    }

    #[test]
    fn config_file_is_loaded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adlead.toml");
        std::fs::write(&path, "[search]\nmax_results = 10\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.search.max_results, 10);
    }
}
