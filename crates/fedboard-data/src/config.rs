use anyhow::Result;
use dotenv::{dotenv, var};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

pub const DEFAULT_FRED_BASE: &str = "https://api.stlouisfed.org";
pub const DEFAULT_TE_BASE: &str = "https://api.tradingeconomics.com";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Every outbound request gives up after this long.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// How long a fetched FRED series is served from memory.
pub const SERIES_TTL: Duration = Duration::from_secs(60);

/// How long a fetched calendar window is served from memory.
pub const CALENDAR_TTL: Duration = Duration::from_secs(30);

/// Runtime settings, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub fred_api_key: Option<String>,
    pub te_api_key: Option<String>,
    pub fred_base_url: Url,
    pub te_base_url: Url,
    pub bind: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let config = Config {
            fred_api_key: non_empty(var("FRED_API_KEY").ok()),
            te_api_key: non_empty(var("TE_API_KEY").ok()),
            fred_base_url: parse_base("FRED_BASE_URL", DEFAULT_FRED_BASE)?,
            te_base_url: parse_base("TE_BASE_URL", DEFAULT_TE_BASE)?,
            bind: var("FEDBOARD_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
        };
        debug!(
            "config loaded: fred key present = {}, te key present = {}, bind = {}",
            config.fred_key_present(),
            config.te_key_present(),
            config.bind
        );

        Ok(config)
    }

    /// Bare config pointing at the given hosts; used to aim the clients at a stub server.
    pub fn with_bases(fred_base_url: Url, te_base_url: Url) -> Self {
        Config {
            fred_api_key: None,
            te_api_key: None,
            fred_base_url,
            te_base_url,
            bind: DEFAULT_BIND.to_string(),
        }
    }

    pub fn fred_key_present(&self) -> bool {
        self.fred_api_key.is_some()
    }

    pub fn te_key_present(&self) -> bool {
        self.te_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::with_bases(
            Url::parse(DEFAULT_FRED_BASE).expect("default FRED base url"),
            Url::parse(DEFAULT_TE_BASE).expect("default TE base url"),
        )
    }
}

// an empty key is as good as no key
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_base(name: &str, default: &str) -> Result<Url> {
    let raw = var(name).unwrap_or_else(|_| default.to_string());
    let url = Url::parse(&raw).map_err(|e| {
        error!("{name} is not a valid url: {raw}");
        e
    })?;
    Ok(url)
}
