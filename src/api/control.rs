//! Bot flag, risk limits, strategy toggles and performance.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use super::JsonBody;
use crate::error::{AppError, Result};
use crate::types::{PerformanceSnapshot, RiskSettings, StrategyToggles};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub bot_running: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RiskUpdated {
    pub message: &'static str,
    pub risk: RiskSettings,
}

#[derive(Debug, Serialize)]
pub struct StrategiesUpdated {
    pub message: &'static str,
    pub strategies: StrategyToggles,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/start", post(start))
        .route("/start-bot", post(start_bot))
        .route("/stop", post(stop))
        .route("/stop-bot", post(stop))
        .route("/risk", get(get_risk).post(set_risk))
        .route("/strategies", get(get_strategies).post(set_strategies))
        .route("/performance", get(performance))
}

/// GET /status
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        bot_running: state.control.is_running(),
    })
}

/// POST /start
async fn start(State(state): State<AppState>) -> Json<MessageResponse> {
    if !state.control.set_running(true) {
        info!("Bot flag set to running");
    }
    Json(MessageResponse {
        message: "Bot started",
    })
}

/// POST /start-bot
async fn start_bot(State(state): State<AppState>) -> Json<MessageResponse> {
    if !state.control.set_running(true) {
        info!("Bot flag set to running");
    }
    Json(MessageResponse {
        message: "Bot flag set to running (use /analyze-now for on-demand signals).",
    })
}

/// POST /stop and /stop-bot
async fn stop(State(state): State<AppState>) -> Json<MessageResponse> {
    if state.control.set_running(false) {
        info!("Bot flag cleared");
    }
    Json(MessageResponse {
        message: "Bot stopped",
    })
}

/// GET /risk
async fn get_risk(State(state): State<AppState>) -> Json<RiskSettings> {
    Json(state.control.risk().await)
}

/// POST /risk
async fn set_risk(
    State(state): State<AppState>,
    body: JsonBody<RiskSettings>,
) -> Result<Json<RiskUpdated>> {
    let Json(risk) = body?;
    risk.validate().map_err(AppError::BadRequest)?;
    state.control.set_risk(risk.clone()).await;
    info!(
        "Risk updated: {}% per trade, {}% max drawdown, {} trades/day",
        risk.risk_per_trade, risk.max_drawdown, risk.max_trades_per_day
    );
    Ok(Json(RiskUpdated {
        message: "Risk updated",
        risk,
    }))
}

/// GET /strategies
async fn get_strategies(State(state): State<AppState>) -> Json<StrategyToggles> {
    Json(state.control.strategies().await)
}

/// POST /strategies
async fn set_strategies(
    State(state): State<AppState>,
    body: JsonBody<StrategyToggles>,
) -> Result<Json<StrategiesUpdated>> {
    let Json(strategies) = body?;
    state.control.set_strategies(strategies).await;
    info!("Strategies updated: {:?}", strategies);
    Ok(Json(StrategiesUpdated {
        message: "Strategies updated",
        strategies,
    }))
}

/// GET /performance
async fn performance(State(state): State<AppState>) -> Json<PerformanceSnapshot> {
    Json(state.control.performance().await)
}
