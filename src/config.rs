use std::time::Duration;

use anyhow::{Result, bail};
use tracing_subscriber::EnvFilter;

use crate::application::RateUpdater;
use crate::domain::ExchangeRate;
use crate::rates::HttpRateProvider;

pub const DEFAULT_DATABASE: &str = "coinbook.db";
pub const DEFAULT_UNIT: &str = "PI";
pub const DEFAULT_CURRENCY: &str = "PHP";
/// Rate used until one has been set or fetched.
pub const DEFAULT_FALLBACK_RATE: &str = "1";
pub const DEFAULT_RATE_TIMEOUT_SECS: u64 = 30;

/// Runtime settings resolved from command line flags, environment
/// variables and an optional `.env` file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: String,
    pub rate_url: Option<String>,
    pub rate_api_key: Option<String>,
    pub rate_timeout: Duration,
    /// Label of the tracked crypto unit
    pub unit: String,
    /// Label of the local fiat currency
    pub currency: String,
    pub fallback_rate: ExchangeRate,
}

impl Settings {
    /// Build the rate updater for the configured endpoint.
    pub fn rate_updater(&self) -> Result<RateUpdater<HttpRateProvider>> {
        let Some(url) = self.rate_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            bail!("No rate service configured. Pass --rate-url or set COINBOOK_RATE_URL");
        };

        let mut provider = HttpRateProvider::with_timeout(url, self.rate_timeout);
        if let Some(key) = &self.rate_api_key {
            provider = provider.with_api_key(key.clone());
        }

        Ok(RateUpdater::new(provider).with_timeout(self.rate_timeout))
    }
}

/// Install the global tracing subscriber, logging to stderr.
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "coinbook=debug" } else { "coinbook=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Errors only when a global subscriber is already installed, which is fine.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
