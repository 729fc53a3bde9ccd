//! Client for the trading-terminal bridge.
//!
//! The bridge is a small HTTP service running next to the terminal. It exposes
//! `GET /status`, `POST /accounts/connect`, `GET /price` and `GET /candles`.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{http_client, send_with_retry, RetryPolicy};
use crate::config::FetchConfig;
use crate::error::{AppError, Result};
use crate::types::{
    Bar, BridgeStatus, CandlesResponse, ConnectRequest, ConnectResponse, Series, Tick, Timeframe,
};

/// Largest candle count requested from the bridge in one call.
pub const MAX_CANDLE_COUNT: u32 = 5000;

pub struct BridgeClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

/// Decode a bridge response, turning non-2xx into `UpstreamFailure` with the
/// bridge's own detail message when it sent one.
async fn decode<T: DeserializeOwned>(what: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or(body);
        return Err(AppError::UpstreamFailure(format!(
            "bridge {} returned {}: {}",
            what, status, detail
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::UpstreamFailure(format!("bridge {} parse error: {}", what, e)))
}

impl BridgeClient {
    pub fn new(base_url: &str, config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(Duration::from_secs(config.timeout_secs))?,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Terminal initialization state.
    pub async fn status(&self) -> Result<BridgeStatus> {
        let url = self.url("/status");
        let response = send_with_retry(&self.retry, "bridge status", || self.client.get(&url)).await?;
        decode("status", response).await
    }

    /// Log the terminal into a trading account. Not retried.
    pub async fn connect(&self, request: &ConnectRequest) -> Result<ConnectResponse> {
        let response = self
            .client
            .post(self.url("/accounts/connect"))
            .json(request)
            .send()
            .await?;
        decode("connect", response).await
    }

    /// Current bid/ask for `symbol`.
    pub async fn price(&self, symbol: &str) -> Result<Tick> {
        let url = self.url("/price");
        let response = send_with_retry(&self.retry, "bridge price", || {
            self.client.get(&url).query(&[("symbol", symbol)])
        })
        .await?;
        decode("price", response).await
    }

    /// The latest `count` candles, oldest first.
    pub async fn candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: u32,
    ) -> Result<CandlesResponse> {
        let url = self.url("/candles");
        let count = count.to_string();
        let response = send_with_retry(&self.retry, "bridge candles", || {
            self.client.get(&url).query(&[
                ("symbol", symbol),
                ("timeframe", timeframe.code()),
                ("count", count.as_str()),
            ])
        })
        .await?;
        let candles: CandlesResponse = decode("candles", response).await?;
        debug!(
            "Bridge returned {} {} candles for {}",
            candles.candles.len(),
            timeframe.code(),
            symbol
        );
        Ok(candles)
    }

    /// Candles as a normalized series.
    pub async fn series(&self, symbol: &str, timeframe: Timeframe, count: u32) -> Result<Series> {
        let response = self.candles(symbol, timeframe, count).await?;
        Ok(Series::from_bars(
            response.candles.iter().map(Bar::from).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// A stand-in bridge on a random local port.
    async fn fake_bridge() -> BridgeClient {
        let app = Router::new()
            .route(
                "/status",
                get(|| async { Json(json!({"initialized": true, "login": "1234", "version": [500, 3815, "01 Jun 2023"]})) }),
            )
            .route(
                "/accounts/connect",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "good" {
                        Ok(Json(json!({"connected": true, "login": body["login"], "server": body["server"]})))
                    } else {
                        Err((StatusCode::UNAUTHORIZED, Json(json!({"detail": "MT5 login failed: (-6, 'Authorization failed')"}))))
                    }
                }),
            )
            .route(
                "/price",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({"symbol": q["symbol"], "bid": 2030.1, "ask": 2030.4, "time": 1700000000}))
                }),
            )
            .route(
                "/candles",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    let count: i64 = q["count"].parse().unwrap();
                    let candles: Vec<Value> = (0..count)
                        .map(|i| json!({"time": 1700000000 + i * 3600, "open": 2000.0, "high": 2001.0, "low": 1999.0, "close": 2000.5, "tick_volume": 7}))
                        .collect();
                    Json(json!({"symbol": q["symbol"], "timeframe": q["timeframe"], "count": candles.len(), "candles": candles}))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        BridgeClient::new(&format!("http://{}/", addr), &FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_status() {
        let status = fake_bridge().await.status().await.unwrap();
        assert!(status.initialized);
        assert_eq!(status.login.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_connect() {
        let bridge = fake_bridge().await;
        let ok = bridge
            .connect(&ConnectRequest {
                login: "1234".into(),
                password: "good".into(),
                server: "Demo-Server".into(),
            })
            .await
            .unwrap();
        assert!(ok.connected);
        assert_eq!(ok.server, "Demo-Server");

        let err = bridge
            .connect(&ConnectRequest {
                login: "1234".into(),
                password: "bad".into(),
                server: "Demo-Server".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamFailure(_)));
        assert!(err.to_string().contains("Authorization failed"));
    }

    #[tokio::test]
    async fn test_price_and_candles() {
        let bridge = fake_bridge().await;
        let tick = bridge.price("XAUUSD").await.unwrap();
        assert_eq!(tick.symbol, "XAUUSD");
        assert!(tick.ask > tick.bid);

        let series = bridge.series("XAUUSD", Timeframe::H1, 24).await.unwrap();
        assert_eq!(series.len(), 24);
        assert_eq!(series.bars()[1].time - series.bars()[0].time, 3600);
        assert_eq!(series.bars()[0].volume, 7.0);
    }

    #[tokio::test]
    async fn test_unreachable_bridge() {
        let config = FetchConfig {
            max_retries: 0,
            ..FetchConfig::default()
        };
        // Port 9 (discard) is closed on test machines
        let bridge = BridgeClient::new("http://127.0.0.1:9", &config).unwrap();
        assert!(matches!(
            bridge.status().await,
            Err(AppError::UpstreamFailure(_))
        ));
    }
}
