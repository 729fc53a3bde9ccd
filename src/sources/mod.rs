//! Market data providers.
//!
//! `MarketData` picks the provider configured at startup and hides the
//! difference between them: every fetch returns a normalized `Series`.

pub mod bridge;
pub mod yahoo;

pub use bridge::{BridgeClient, MAX_CANDLE_COUNT};
pub use yahoo::YahooFinanceClient;

use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Config, DataSource, FetchConfig};
use crate::error::{AppError, Result};
use crate::types::{Series, Timeframe};

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Shared HTTP client with the configured timeout.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Send a request, retrying connect errors, timeouts and 5xx responses.
///
/// `build` is called once per attempt since a `RequestBuilder` is consumed on
/// send. Any other failure, and a 4xx response, is returned as-is.
pub async fn send_with_retry<F>(policy: &RetryPolicy, what: &str, build: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error = String::new();

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            let delay = policy.delay_for(attempt);
            debug!("Retrying {} in {:?} (attempt {})", what, delay, attempt + 1);
            tokio::time::sleep(delay).await;
        }

        match build().send().await {
            Ok(response) if response.status().is_server_error() => {
                last_error = format!("HTTP {}", response.status());
                warn!("{} returned {}", what, response.status());
            }
            Ok(response) => return Ok(response),
            Err(e) if e.is_connect() || e.is_timeout() => {
                warn!("{} failed: {}", what, e);
                last_error = e.to_string();
            }
            Err(e) => return Err(AppError::UpstreamFailure(format!("{}: {}", what, e))),
        }
    }

    Err(AppError::UpstreamFailure(format!(
        "{} failed after {} attempts: {}",
        what,
        policy.max_retries + 1,
        last_error
    )))
}

/// Candles needed to cover `lookback_days`, capped at what the bridge serves.
fn bridge_candle_count(lookback_days: u32, timeframe: Timeframe) -> Result<u32> {
    let wanted = lookback_days
        .max(1)
        .checked_mul(timeframe.bars_per_day())
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "{} days of {} candles is out of range",
                lookback_days,
                timeframe.code()
            ))
        })?;
    if wanted > MAX_CANDLE_COUNT {
        debug!(
            "Capping bridge request at {} candles ({} wanted)",
            MAX_CANDLE_COUNT, wanted
        );
    }
    Ok(wanted.min(MAX_CANDLE_COUNT))
}

/// The configured source of price bars.
#[derive(Clone)]
pub enum MarketData {
    Yahoo(Arc<YahooFinanceClient>),
    Bridge(Arc<BridgeClient>),
    /// A fixed in-memory series, for replaying captured data.
    Fixed(Arc<Series>),
}

impl MarketData {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.data_source {
            DataSource::Yahoo => Ok(MarketData::Yahoo(Arc::new(YahooFinanceClient::new(
                &config.fetch,
            )?))),
            DataSource::Bridge => {
                let url = config.bridge_url.as_deref().ok_or_else(|| {
                    AppError::BadRequest("DATA_SOURCE=bridge requires BRIDGE_URL".to_string())
                })?;
                Ok(MarketData::Bridge(Arc::new(BridgeClient::new(
                    url,
                    &config.fetch,
                )?)))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MarketData::Yahoo(_) => "yahoo",
            MarketData::Bridge(_) => "bridge",
            MarketData::Fixed(_) => "fixed",
        }
    }

    /// Ordered bars for `symbol` at `interval` covering `lookback_days`.
    ///
    /// Fails with `NoData` when the provider returns nothing usable.
    pub async fn fetch(&self, symbol: &str, interval: &str, lookback_days: u32) -> Result<Series> {
        let series = match self {
            MarketData::Yahoo(client) => client.get_series(symbol, interval, lookback_days).await?,
            MarketData::Bridge(client) => {
                let timeframe = Timeframe::from_str(interval).ok_or_else(|| {
                    AppError::BadRequest(format!("unsupported interval '{}'", interval))
                })?;
                let count = bridge_candle_count(lookback_days, timeframe)?;
                client.series(symbol, timeframe, count).await?
            }
            MarketData::Fixed(series) => series.as_ref().clone(),
        };

        if series.is_empty() {
            return Err(AppError::NoData(format!(
                "No data returned for {} {} from {}. Try a different interval or symbol.",
                symbol,
                interval,
                self.name()
            )));
        }

        debug!(
            "Fetched {} bars for {} {} ({} days) from {}",
            series.len(),
            symbol,
            interval,
            lookback_days,
            self.name()
        );
        Ok(series)
    }
}
