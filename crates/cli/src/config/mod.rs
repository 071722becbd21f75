use bank_client::Environment;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/bank.toml";
const ENV_PREFIX: &str = "BANK";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults to `sandbox`, unlike `Client::builder()` which targets
    /// production: the CLI only touches live money when asked to.
    pub environment: Environment,
    /// Replaces the environment's base URL (e.g. a local mock server).
    pub base_url: Option<String>,
    pub api_key: String,
    pub timeout_secs: u64,
    pub level: String,
    /// Default `limit` of list calls.
    pub page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Sandbox,
            base_url: None,
            api_key: String::new(),
            timeout_secs: 60,
            level: "info".to_string(),
            page_size: 100,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "bank",
    about = "Browse banking platform resources from the command line",
    disable_version_flag = true
)]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override environment (production or sandbox).
    #[arg(long, global = true)]
    pub environment: Option<Environment>,
    /// Override base URL (e.g. http://127.0.0.1:4010).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override log level (the API key is never read from CLI).
    #[arg(long, global = true)]
    pub level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List transactions.
    Transactions(TransactionsArgs),
    /// List card disputes.
    CardDisputes(CardDisputesArgs),
    /// List check transfers.
    CheckTransfers(CheckTransfersArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct Paging {
    /// Page size sent to the server.
    #[arg(long)]
    pub limit: Option<u32>,
    /// Stop after this many items.
    #[arg(long)]
    pub max_items: Option<usize>,
    /// Print one line per page (item count and next cursor) instead of items.
    #[arg(long)]
    pub pages: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct TransactionsArgs {
    #[arg(long)]
    pub account_id: Option<String>,
    #[arg(long)]
    pub route_id: Option<String>,
    /// Source category; repeat the flag or separate with commas.
    #[arg(long = "category", value_delimiter = ',')]
    pub categories: Vec<String>,
    /// Only transactions created after this RFC 3339 timestamp.
    #[arg(long, value_parser = parse_timestamp)]
    pub created_after: Option<DateTime<Utc>>,
    /// Only transactions created before this RFC 3339 timestamp.
    #[arg(long, value_parser = parse_timestamp)]
    pub created_before: Option<DateTime<Utc>>,
    #[command(flatten)]
    pub paging: Paging,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CardDisputesArgs {
    /// Dispute status; repeat the flag or separate with commas.
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<String>,
    #[command(flatten)]
    pub paging: Paging,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CheckTransfersArgs {
    #[arg(long)]
    pub account_id: Option<String>,
    /// Transfer status; repeat the flag or separate with commas.
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<String>,
    #[command(flatten)]
    pub paging: Paging,
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}

/// Reads the config file and `BANK_*` variables, then applies CLI overrides.
pub fn load(cli: &Cli) -> Result<AppConfig> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(environment) = cli.environment {
        settings.environment = environment;
    }
    if let Some(base_url) = &cli.base_url {
        settings.base_url = Some(base_url.clone());
    }
    if let Some(level) = &cli.level {
        settings.level = level.clone();
    }

    Ok(settings)
}
