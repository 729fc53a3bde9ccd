//! Yahoo Finance API client for historical bars.
//!
//! Uses the unofficial chart API. Intraday history is limited by Yahoo, so
//! lookbacks are clamped per interval before the request is made.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{http_client, send_with_retry, RetryPolicy};
use crate::config::FetchConfig;
use crate::error::{AppError, Result};
use crate::types::{Bar, Series};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

/// Yahoo `range` parameter for a lookback, clamped to what the interval allows.
pub fn lookback_range(interval: &str, lookback_days: u32) -> String {
    let days = match interval {
        "1h" | "60m" => lookback_days.min(730),
        "30m" | "15m" => lookback_days.min(60),
        "1d" => lookback_days.min(3650),
        _ => lookback_days,
    };
    format!("{}d", days.max(1))
}

/// Turn a chart response into bars (seconds timestamps).
///
/// Rows where every field is null (holidays) are skipped; partially null rows
/// become NaN and are dropped when the `Series` is built.
fn parse_chart(symbol: &str, data: YahooChartResponse) -> Result<Vec<Bar>> {
    if let Some(error) = data.chart.error {
        return Err(AppError::UpstreamFailure(format!(
            "Yahoo API error for {}: {} - {}",
            symbol, error.code, error.description
        )));
    }

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();
    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &time) in timestamps.iter().enumerate() {
        let (open, high, low, close) = (at(&opens, i), at(&highs, i), at(&lows, i), at(&closes, i));
        if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
            continue;
        }

        bars.push(Bar::new(
            time,
            open.unwrap_or(f64::NAN),
            high.unwrap_or(f64::NAN),
            low.unwrap_or(f64::NAN),
            close.unwrap_or(f64::NAN),
            volumes.get(i).copied().flatten().unwrap_or(0) as f64,
        ));
    }

    Ok(bars)
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(Duration::from_secs(config.timeout_secs))?,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::from_config(config),
        })
    }

    /// Point the client at another host (a mirror or a test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Chart endpoint for `symbol`, encoded as a single path segment.
    fn chart_url(&self, symbol: &str) -> Result<reqwest::Url> {
        let invalid = || AppError::Internal(format!("invalid Yahoo base URL '{}'", self.base_url));
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", normalize_yahoo_symbol(symbol).as_str()]);
        Ok(url)
    }

    /// Fetch historical bars.
    ///
    /// Arguments:
    /// - symbol: Yahoo symbol (e.g., "XAUUSD=X", "GC=F")
    /// - interval: Bar interval ("15m", "30m", "1h", "1d", ...)
    /// - lookback_days: Calendar days of history, clamped per interval
    pub async fn get_series(&self, symbol: &str, interval: &str, lookback_days: u32) -> Result<Series> {
        let url = self.chart_url(symbol)?;
        let range = lookback_range(interval, lookback_days);

        debug!("Fetching Yahoo Finance data: {} range={} interval={}", url, range, interval);

        let response = send_with_retry(&self.retry, "Yahoo chart request", || {
            self.client.get(url.clone()).query(&[
                ("range", range.as_str()),
                ("interval", interval),
                ("includePrePost", "false"),
            ])
        })
        .await?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamFailure(format!(
                "Yahoo API error: {}",
                response.status()
            )));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Yahoo parse error: {}", e)))?;

        Ok(Series::from_bars(parse_chart(symbol, data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(json: &str) -> YahooChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_yahoo_symbol() {
        assert_eq!(normalize_yahoo_symbol("xauusd=x"), "XAUUSD=X");
        assert_eq!(normalize_yahoo_symbol("BRK.B"), "BRK-B");
    }

    #[test]
    fn test_lookback_clamping() {
        assert_eq!(lookback_range("1h", 180), "180d");
        assert_eq!(lookback_range("1h", 1000), "730d");
        assert_eq!(lookback_range("15m", 180), "60d");
        assert_eq!(lookback_range("30m", 30), "30d");
        assert_eq!(lookback_range("1d", 5000), "3650d");
        assert_eq!(lookback_range("4h", 400), "400d");
        assert_eq!(lookback_range("1h", 0), "1d");
    }

    #[test]
    fn test_parse_chart() {
        let data = chart(
            r#"{"chart": {"result": [{
                "timestamp": [1700000000, 1700003600, 1700007200],
                "indicators": {"quote": [{
                    "open": [2000.0, null, 2002.0],
                    "high": [2005.0, null, 2006.0],
                    "low": [1995.0, null, 2001.0],
                    "close": [2003.0, null, 2004.0],
                    "volume": [10, null, 12]
                }]}
            }], "error": null}}"#,
        );
        let bars = parse_chart("XAUUSD=X", data).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time, 1700000000);
        assert_eq!(bars[1].close, 2004.0);
        assert_eq!(bars[1].volume, 12.0);
    }

    #[test]
    fn test_partial_rows_are_dropped_by_series() {
        let data = chart(
            r#"{"chart": {"result": [{
                "timestamp": [1700000000, 1700003600],
                "indicators": {"quote": [{
                    "open": [2000.0, 2001.0],
                    "high": [2005.0, null],
                    "low": [1995.0, 1999.0],
                    "close": [2003.0, 2002.0]
                }]}
            }], "error": null}}"#,
        );
        let series = Series::from_bars(parse_chart("XAUUSD=X", data).unwrap());
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].volume, 0.0);
    }

    #[test]
    fn test_api_error_is_upstream_failure() {
        let data = chart(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
        );
        let err = parse_chart("NOPE", data).unwrap_err();
        assert!(matches!(err, AppError::UpstreamFailure(_)));
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_empty_result() {
        let data = chart(r#"{"chart": {"result": [], "error": null}}"#);
        assert!(parse_chart("XAUUSD=X", data).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_symbol_cannot_inject_query_parameters() {
        use axum::{
            extract::{Path, Query},
            routing::get,
            Json, Router,
        };
        use std::collections::HashMap;

        let app = Router::new().route(
            "/v8/finance/chart/:symbol",
            get(
                |Path(symbol): Path<String>, Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(symbol, "GC=F&INTERVAL=1D?X");
                    assert_eq!(params.get("interval").map(String::as_str), Some("1h"));
                    assert_eq!(params.get("range").map(String::as_str), Some("30d"));
                    Json(serde_json::json!({"chart": {"result": [], "error": null}}))
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = YahooFinanceClient::new(&FetchConfig::default())
            .unwrap()
            .with_base_url(format!("http://{}", addr));
        let series = client
            .get_series("GC=F&INTERVAL=1D?X", "1h", 30)
            .await
            .unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_get_series_against_local_server() {
        use axum::{routing::get, Json, Router};

        let app = Router::new().route(
            "/v8/finance/chart/:symbol",
            get(|| async {
                Json(serde_json::json!({"chart": {"result": [{
                    "timestamp": [1700003600, 1700000000],
                    "indicators": {"quote": [{
                        "open": [2001.0, 2000.0],
                        "high": [2006.0, 2005.0],
                        "low": [1999.0, 1995.0],
                        "close": [2004.0, 2003.0],
                        "volume": [1, 2]
                    }]}
                }], "error": null}}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = YahooFinanceClient::new(&FetchConfig::default())
            .unwrap()
            .with_base_url(format!("http://{}", addr));
        let series = client.get_series("XAUUSD=X", "1h", 30).await.unwrap();
        // Sorted on the way in
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].time, 1700000000);
    }
}
