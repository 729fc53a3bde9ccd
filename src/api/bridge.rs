//! Pass-through endpoints for the terminal bridge.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{JsonBody, QueryParams};
use crate::error::{AppError, Result};
use crate::sources::{BridgeClient, MAX_CANDLE_COUNT};
use crate::types::{BridgeStatus, CandlesResponse, ConnectRequest, ConnectResponse, Tick, Timeframe};
use crate::AppState;

const DEFAULT_BRIDGE_SYMBOL: &str = "XAUUSD";
const DEFAULT_CANDLE_COUNT: u32 = 300;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandlesQuery {
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub count: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bridge/status", get(status))
        .route("/bridge/connect", post(connect))
        .route("/bridge/price", get(price))
        .route("/bridge/candles", get(candles))
}

fn client(state: &AppState) -> Result<Arc<BridgeClient>> {
    state
        .bridge
        .clone()
        .ok_or_else(|| AppError::BadRequest("BRIDGE_URL is not configured".to_string()))
}

/// GET /bridge/status
async fn status(State(state): State<AppState>) -> Result<Json<BridgeStatus>> {
    Ok(Json(client(&state)?.status().await?))
}

/// POST /bridge/connect
async fn connect(
    State(state): State<AppState>,
    body: JsonBody<ConnectRequest>,
) -> Result<Json<ConnectResponse>> {
    let bridge = client(&state)?;
    let Json(request) = body?;
    Ok(Json(bridge.connect(&request).await?))
}

/// GET /bridge/price?symbol=XAUUSD
async fn price(
    State(state): State<AppState>,
    query: QueryParams<PriceQuery>,
) -> Result<Json<Tick>> {
    let bridge = client(&state)?;
    let Query(query) = query?;
    let symbol = query.symbol.as_deref().unwrap_or(DEFAULT_BRIDGE_SYMBOL);
    Ok(Json(bridge.price(symbol).await?))
}

/// GET /bridge/candles?symbol=XAUUSD&timeframe=H1&count=300
async fn candles(
    State(state): State<AppState>,
    query: QueryParams<CandlesQuery>,
) -> Result<Json<CandlesResponse>> {
    let bridge = client(&state)?;
    let Query(query) = query?;
    let code = query.timeframe.as_deref().unwrap_or("H1");
    let timeframe = Timeframe::from_str(code)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported timeframe: {}", code)))?;
    let count = query.count.unwrap_or(DEFAULT_CANDLE_COUNT);
    if count == 0 || count > MAX_CANDLE_COUNT {
        return Err(AppError::BadRequest(format!(
            "count must be between 1 and {}",
            MAX_CANDLE_COUNT
        )));
    }
    let symbol = query.symbol.as_deref().unwrap_or(DEFAULT_BRIDGE_SYMBOL);
    Ok(Json(bridge.candles(symbol, timeframe, count).await?))
}
