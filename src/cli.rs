//! Command-line parsing and process entry point

use crate::api::{HttpSearchApi, SearchApi};
use crate::config::{Config, DEFAULT_API_URL};
use crate::format::Locale;
use crate::tui::run_tui;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// lookahead - search-as-you-type over a remote item index
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Query typed into the search box at start
    pub query: Option<String>,

    /// Base address of the search backend
    #[arg(long, env = "LOOKAHEAD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Open the detail view of this item instead of the search screen
    #[arg(long)]
    pub item: Option<String>,

    /// Maximum number of suggestions requested per search
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Quiet interval before a typed query is sent
    #[arg(long, default_value_t = 300)]
    pub debounce_ms: u64,

    /// Per-request timeout
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Locale for price grouping and dates (en-IN, en-US)
    #[arg(long, default_value = "en-IN")]
    pub locale: Locale,

    /// Currency symbol prefixed to prices
    #[arg(long, default_value = "₹")]
    pub currency: String,

    /// Run QUERY once and print the ranked results instead of starting the UI
    #[arg(long, requires = "query")]
    pub print: bool,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn to_config(&self) -> Config {
        let mut config = Config::default().with_api_base_url(&self.api_url);
        config.result_limit = self.limit;
        config.debounce = Duration::from_millis(self.debounce_ms);
        config.request_timeout = Duration::from_millis(self.timeout_ms);
        config.price_format.locale = self.locale;
        config.price_format.currency_symbol = self.currency.clone();
        config
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or(if log_file.is_some() {
        "info"
    } else {
        "off"
    });
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("Failed to initialize logger")?;
    Ok(())
}

/// CLI実行エントリーポイント
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = cli.to_config();
    log::info!("Using backend {}", config.api_base_url);

    let api: Arc<dyn SearchApi> = Arc::new(HttpSearchApi::new(&config)?);

    if cli.print {
        let query = cli.query.clone().unwrap_or_default();
        return print_results(api.as_ref(), &config, &query).await;
    }

    run_tui(config, api, cli.query.clone(), cli.item.clone()).await
}

async fn print_results(api: &dyn SearchApi, config: &Config, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Ok(());
    }
    let response = api
        .search(query, config.result_limit)
        .await
        .with_context(|| format!("Search for '{}' failed", query))?;

    if response.results.is_empty() {
        eprintln!("No results found.");
        return Ok(());
    }
    for candidate in &response.results {
        println!(
            "{}\t{}\t{}\t{}",
            candidate.id,
            candidate.name,
            candidate.category,
            config.price_format.format(candidate.price)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_from_args() {
        let cli = Cli::try_parse_from(["lookahead", "--api-url", "http://backend/api/"]).unwrap();
        let config = cli.to_config();
        assert_eq!(config.api_base_url, "http://backend/api");
        assert_eq!(config.result_limit, 10);
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.price_format.currency_symbol, "₹");
        assert!(cli.query.is_none());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "lookahead",
            "--api-url",
            "http://backend/api",
            "--limit",
            "5",
            "--debounce-ms",
            "150",
            "--locale",
            "en-US",
            "--currency",
            "$",
            "lap",
        ])
        .unwrap();
        let config = cli.to_config();
        assert_eq!(config.result_limit, 5);
        assert_eq!(config.debounce, Duration::from_millis(150));
        assert_eq!(config.locale(), Locale::EnUs);
        assert_eq!(cli.query.as_deref(), Some("lap"));
    }

    #[test]
    fn test_print_requires_query() {
        assert!(Cli::try_parse_from(["lookahead", "--api-url", "http://x", "--print"]).is_err());
    }

    #[test]
    fn test_invalid_locale_rejected() {
        assert!(
            Cli::try_parse_from(["lookahead", "--api-url", "http://x", "--locale", "xx"]).is_err()
        );
    }

    #[test]
    #[serial]
    fn test_api_url_from_env() {
        std::env::set_var("LOOKAHEAD_API_URL", "http://from-env:9000/api/");
        let cli = Cli::try_parse_from(["lookahead"]).unwrap();
        std::env::remove_var("LOOKAHEAD_API_URL");
        assert_eq!(cli.to_config().api_base_url, "http://from-env:9000/api");
    }

    #[test]
    #[serial]
    fn test_log_file_receives_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookahead.log");
        init_logging(Some(&path)).unwrap();
        log::warn!("written to file");
        log::logger().flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("written to file"));
    }
}
