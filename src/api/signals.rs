//! Training and signal endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{JsonBody, QueryParams};
use crate::error::{AppError, Result};
use crate::services::model::TrainingMetrics;
use crate::services::NotifyOutcome;
use crate::types::{MarketAnalysis, TradePlan};
use crate::AppState;

/// Default training window.
const DEFAULT_TRAIN_DAYS: u32 = 180;
/// Default analysis window.
const DEFAULT_ANALYSIS_DAYS: u32 = 365;

#[derive(Debug, Default, Deserialize)]
pub struct TrainRequest {
    pub period_days: Option<u32>,
    pub symbol: Option<String>,
    pub interval: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    #[serde(default)]
    pub notify_telegram: bool,
}

/// Query parameters for `/analyze-tradingview`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub period_days: Option<u32>,
    pub symbol: Option<String>,
    pub interval: Option<String>,
    #[serde(default)]
    pub notify_telegram: bool,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub status: &'static str,
    pub metrics: TrainingMetrics,
}

#[derive(Debug, Serialize)]
pub struct SignalResponse {
    pub status: &'static str,
    pub signal: TradePlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotifyOutcome>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub status: &'static str,
    pub data: MarketAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotifyOutcome>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/train", post(train))
        .route("/analyze-now", post(analyze_now))
        .route("/analyze-tradingview", post(analyze_tradingview))
}

fn positive_days(days: u32) -> Result<u32> {
    if days == 0 {
        return Err(AppError::BadRequest("period_days must be at least 1".to_string()));
    }
    Ok(days)
}

/// Body of an endpoint whose fields all have defaults.
///
/// A request without a JSON body gets the defaults. A body that is present but
/// malformed is rejected.
fn body_or_default<T: Default>(body: JsonBody<T>) -> Result<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Send an alert, reporting a transport failure in the outcome instead of
/// failing a request whose signal was already computed.
async fn notify(state: &AppState, plan: &TradePlan) -> NotifyOutcome {
    match state.notifier.notify(plan).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Telegram alert failed: {}", e);
            NotifyOutcome {
                sent: false,
                reason: Some(e.to_string()),
                status_code: None,
            }
        }
    }
}

/// POST /train
///
/// The body may be omitted; every field falls back to its default.
async fn train(
    State(state): State<AppState>,
    body: JsonBody<TrainRequest>,
) -> Result<Json<TrainResponse>> {
    let request = body_or_default(body)?;
    let symbol = request
        .symbol
        .unwrap_or_else(|| state.config.default_symbol.clone());
    let interval = request
        .interval
        .unwrap_or_else(|| state.config.default_interval.clone());
    let days = positive_days(request.period_days.unwrap_or(DEFAULT_TRAIN_DAYS))?;

    let metrics = state.signals.train(&symbol, &interval, days).await?;
    Ok(Json(TrainResponse {
        status: "trained",
        metrics,
    }))
}

/// POST /analyze-now
///
/// Probability-mode signal from the trained model.
async fn analyze_now(
    State(state): State<AppState>,
    body: JsonBody<AnalyzeRequest>,
) -> Result<Json<SignalResponse>> {
    let request = body_or_default(body)?;
    let symbol = request
        .symbol
        .unwrap_or_else(|| state.config.default_symbol.clone());
    let interval = request
        .interval
        .unwrap_or_else(|| state.config.default_interval.clone());

    let signal = state.signals.predict(&symbol, &interval).await?;
    let notification = if request.notify_telegram {
        Some(notify(&state, &signal).await)
    } else {
        None
    };

    Ok(Json(SignalResponse {
        status: "ok",
        signal,
        notification,
    }))
}

/// POST /analyze-tradingview?period_days=365
///
/// Score-mode analysis using the current strategy toggles.
async fn analyze_tradingview(
    State(state): State<AppState>,
    query: QueryParams<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>> {
    let Query(query) = query?;
    let symbol = query
        .symbol
        .unwrap_or_else(|| state.config.default_symbol.clone());
    let interval = query.interval.unwrap_or_else(|| "1h".to_string());
    let days = positive_days(query.period_days.unwrap_or(DEFAULT_ANALYSIS_DAYS))?;
    let toggles = state.control.strategies().await;

    let data = state
        .signals
        .analyze_market(&symbol, &interval, days, &toggles)
        .await?;
    let notification = if query.notify_telegram {
        Some(notify(&state, &data.plan).await)
    } else {
        None
    };

    Ok(Json(AnalysisResponse {
        status: "ok",
        data,
        notification,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_query_defaults() {
        let query: AnalysisQuery = serde_urlencoded::from_str("").unwrap();
        assert!(query.period_days.is_none());
        assert!(!query.notify_telegram);

        let query: AnalysisQuery =
            serde_urlencoded::from_str("period_days=90&symbol=GC%3DF&notify_telegram=true").unwrap();
        assert_eq!(query.period_days, Some(90));
        assert_eq!(query.symbol.as_deref(), Some("GC=F"));
        assert!(query.notify_telegram);
    }

    #[test]
    fn test_train_request_partial_body() {
        let request: TrainRequest = serde_json::from_str(r#"{"period_days": 365}"#).unwrap();
        assert_eq!(request.period_days, Some(365));
        assert!(request.symbol.is_none());
    }

    #[test]
    fn test_positive_days() {
        assert!(positive_days(0).is_err());
        assert_eq!(positive_days(30).unwrap(), 30);
    }
}
