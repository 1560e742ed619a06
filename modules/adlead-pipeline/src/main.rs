use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use adlead_common::config::{load_config, load_config_or_default, ActiveStatus};
use adlead_common::{AppConfig, FileConfig, FilterMode};
use adlead_pipeline::runner::{load_phase2_input, run_both, run_phase1, run_phase2};
use adlead_pipeline::AdSearchQuery;
use apify_client::ApifyClient;

const DEFAULT_CONFIG: &str = "./adlead.toml";

#[derive(Parser)]
#[command(name = "adlead", about = "Collect and enrich advertiser leads from the Facebook Ads Library")]
struct Cli {
    /// Path to config TOML file [default: ./adlead.toml, optional]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Phase 1: search the ads library and write the cleaned page list
    Clean(SearchArgs),
    /// Phase 2: enrich a cleaned page list with contact details
    Enrich {
        /// Cleaned CSV to enrich [default: phase 1 output]
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Phase 1 then phase 2
    Run(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Search keyword, e.g. "marketing"
    #[arg(short, long)]
    keyword: String,

    /// 2-letter country code
    #[arg(short, long)]
    country: Option<String>,

    /// Number of ads to fetch
    #[arg(short = 'n', long)]
    max_results: Option<u32>,

    /// Which ads to include [default: from config]
    #[arg(long, value_enum)]
    status: Option<StatusArg>,

    /// Ad text filtering
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Strict,
    Lenient,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StatusArg {
    /// Only ads currently running
    Active,
    /// Active and inactive ads
    All,
}

impl From<StatusArg> for ActiveStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => ActiveStatus::Active,
            StatusArg::All => ActiveStatus::All,
        }
    }
}

impl From<ModeArg> for FilterMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => FilterMode::Strict,
            ModeArg::Lenient => FilterMode::Lenient,
        }
    }
}

impl SearchArgs {
    fn query(&self, config: &FileConfig) -> Result<AdSearchQuery> {
        Ok(AdSearchQuery::from_config(
            &self.keyword,
            self.country.as_deref(),
            self.max_results,
            self.status.map(ActiveStatus::from),
            &config.search,
        )?)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_client(app: &AppConfig, config: &FileConfig) -> Result<ApifyClient> {
    let client = ApifyClient::with_timeout(
        app.apify_api_token.clone(),
        Duration::from_secs(config.apify.request_timeout_secs),
    )
    .context("Failed to build Apify HTTP client")?
    .max_retries(config.apify.max_retries)
    .actors(&config.apify.ads_actor, &config.apify.pages_actor)
    .run_timeouts(
        Duration::from_secs(config.search.timeout_secs),
        Duration::from_secs(config.enrich.timeout_secs),
    );
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    info!("adlead starting");

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_config_or_default(&PathBuf::from(DEFAULT_CONFIG))?,
    };

    // Secrets are checked before any work is done.
    let app = AppConfig::from_env()?;
    let client = build_client(&app, &config)?;

    match cli.command {
        Command::Clean(args) => {
            if let Some(mode) = args.mode {
                config.pipeline.filter_mode = mode.into();
            }
            let query = args.query(&config)?;
            let report = run_phase1(&client, &query, &config).await?;
            info!("{}", report.stats);
        }
        Command::Enrich { input } => {
            let rows = load_phase2_input(input.as_deref(), &config)?;
            let report = run_phase2(&client, rows, &config).await?;
            info!("{}", report.stats);
        }
        Command::Run(args) => {
            if let Some(mode) = args.mode {
                config.pipeline.filter_mode = mode.into();
            }
            let query = args.query(&config)?;
            let (phase1, phase2) = run_both(&client, &client, &query, &config).await?;
            info!("{}", phase1.stats);
            info!("{}", phase2.stats);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_args(argv: &[&str]) -> SearchArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Clean(args) | Command::Run(args) => args,
            Command::Enrich { .. } => panic!("expected a search command"),
        }
    }

    #[test]
    fn status_flag_overrides_config_both_ways() {
        let mut config = FileConfig::default();
        config.search.active_status = ActiveStatus::All;

        let args = search_args(&["adlead", "clean", "-k", "bikes", "--status", "active"]);
        assert_eq!(args.query(&config).unwrap().active_status, ActiveStatus::Active);

        config.search.active_status = ActiveStatus::Active;
        let args = search_args(&["adlead", "run", "-k", "bikes", "--status", "all"]);
        assert_eq!(args.query(&config).unwrap().active_status, ActiveStatus::All);
    }

    #[test]
    fn status_defaults_to_config() {
        let mut config = FileConfig::default();
        config.search.active_status = ActiveStatus::All;

        let args = search_args(&["adlead", "clean", "-k", "bikes"]);
        assert_eq!(args.status, None);
        assert_eq!(args.query(&config).unwrap().active_status, ActiveStatus::All);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(Cli::try_parse_from(["adlead", "clean", "-k", "bikes", "--status", "paused"]).is_err());
    }
}
