//! Signal aggregator.
//!
//! Two ways to reach a `TradePlan`:
//! - score mode weighs indicator state and detector output into a single score
//! - probability mode thresholds a classifier's up-probability
//!
//! Both place stops and targets at fixed ATR multiples from the latest close.

use crate::error::{AppError, Result};
use crate::services::signals::indicators::IndicatorFrame;
use crate::types::{
    CandleFlags, Direction, IndicatorSnapshot, MarketAnalysis, PatternKind, PatternObservation,
    PayapaFlags, Polarity, StructureSummary, TradePlan,
};

/// Score at or above which score mode goes long.
pub const BUY_SCORE: f64 = 1.0;
/// Score at or below which score mode goes short.
pub const SELL_SCORE: f64 = -1.0;
/// Score magnitude that maps to full confidence.
pub const FULL_CONFIDENCE_SCORE: f64 = 2.5;

pub const BUY_PROBABILITY: f64 = 0.55;
pub const SELL_PROBABILITY: f64 = 0.45;

pub const STOP_ATR_MULTIPLE: f64 = 1.2;
pub const TARGET_ATR_MULTIPLE: f64 = 2.0;

const TREND_WEIGHT: f64 = 0.8;
const RSI_WEIGHT: f64 = 0.5;
const PAYAPA_WEIGHT: f64 = 0.6;
const STRUCTURE_WEIGHT: f64 = 0.4;
const OUTSIDE_BAR_WEIGHT: f64 = 0.2;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

const PROBABILITY_NOTES: &str = "ATR-based SL/TP; thresholds BUY>=0.55, SELL<=0.45";
const SCORE_NOTES: &str = "Score-based SMC/indicator confluence; ATR-based SL/TP; thresholds BUY>=1.0, SELL<=-1.0";

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Reason added when a directional plan is downgraded for lack of volatility.
pub const NO_VOLATILITY_REASON: &str = "atr_too_small";

/// Stop-loss and take-profit for a direction, rounded to cents.
///
/// `None` for FLAT, and when ATR is too small for the stop to sit apart from
/// the rounded entry.
fn levels(direction: Direction, close: f64, atr: f64) -> Option<(f64, f64)> {
    let (stop, target) = match direction {
        Direction::Buy => (
            close - STOP_ATR_MULTIPLE * atr,
            close + TARGET_ATR_MULTIPLE * atr,
        ),
        Direction::Sell => (
            close + STOP_ATR_MULTIPLE * atr,
            close - TARGET_ATR_MULTIPLE * atr,
        ),
        Direction::Flat => return None,
    };
    let (stop, target) = (round_to(stop, 2), round_to(target, 2));
    if !stop.is_finite() || !target.is_finite() || stop == round_to(close, 2) {
        return None;
    }
    Some((stop, target))
}

/// Final direction and levels. A BUY or SELL without room for a stop is FLAT.
fn place(
    direction: Direction,
    close: f64,
    atr: f64,
    reasons: &mut Vec<String>,
) -> (Direction, Option<f64>, Option<f64>) {
    if direction == Direction::Flat {
        return (Direction::Flat, None, None);
    }
    match levels(direction, close, atr) {
        Some((stop, target)) => (direction, Some(stop), Some(target)),
        None => {
            reasons.push(NO_VOLATILITY_REASON.to_string());
            (Direction::Flat, None, None)
        }
    }
}

/// Build a plan from the classifier's probability that the next bar closes up.
pub fn probability_plan(
    close: f64,
    atr: f64,
    prob_up: f64,
    symbol: &str,
    timeframe: &str,
) -> TradePlan {
    let (direction, reason) = if prob_up >= BUY_PROBABILITY {
        (Direction::Buy, "model_prob_up")
    } else if prob_up <= SELL_PROBABILITY {
        (Direction::Sell, "model_prob_down")
    } else {
        (Direction::Flat, "model_undecided")
    };
    let mut reasons = vec![reason.to_string()];
    let (direction, stop_loss, take_profit) = place(direction, close, atr, &mut reasons);

    TradePlan {
        direction,
        entry: round_to(close, 2),
        stop_loss,
        take_profit,
        notes: PROBABILITY_NOTES.to_string(),
        reasons,
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        confidence: round_to(prob_up, 3),
        generated_at: chrono::Utc::now().timestamp_millis(),
    }
}

/// Direction for an aggregated score.
pub fn score_direction(score: f64) -> Direction {
    if score >= BUY_SCORE {
        Direction::Buy
    } else if score <= SELL_SCORE {
        Direction::Sell
    } else {
        Direction::Flat
    }
}

/// Weigh the latest row of an extended frame and the detector output into a
/// full analysis with its trade plan.
///
/// Observations are grouped by kind; detectors that were toggled off simply
/// contribute nothing.
pub fn score_analysis(
    frame: &IndicatorFrame,
    observations: &[PatternObservation],
    symbol: &str,
    timeframe: &str,
) -> Result<MarketAnalysis> {
    let last = frame
        .last()
        .ok_or_else(|| AppError::InsufficientData("empty indicator frame".to_string()))?;
    let extended = last.extended.ok_or_else(|| {
        AppError::Internal("score mode needs EMA200 and MACD columns".to_string())
    })?;

    let indicators = IndicatorSnapshot {
        close: last.bar.close,
        ema20: last.ema20,
        ema50: last.ema50,
        ema200: extended.ema200,
        rsi14: last.rsi14,
        atr14: last.atr14,
        macd: extended.macd,
        macd_signal: extended.macd_signal,
    };

    let of_kind = |kind: PatternKind| -> Vec<PatternObservation> {
        observations
            .iter()
            .filter(|o| o.kind == kind)
            .cloned()
            .collect()
    };
    let has = |kind: PatternKind, polarity: Option<Polarity>| {
        observations
            .iter()
            .any(|o| o.kind == kind && polarity.map_or(true, |p| o.polarity == p))
    };

    let structure = observations
        .iter()
        .find(|o| o.kind == PatternKind::StructureBreak)
        .map(|o| StructureSummary {
            bos: (o.polarity != Polarity::Neutral).then_some(o.polarity),
            last_high: o.high,
            last_low: o.low,
        });
    let payapa = PayapaFlags {
        payapa_buy: has(PatternKind::MomentumExtreme, Some(Polarity::Bullish)),
        payapa_sell: has(PatternKind::MomentumExtreme, Some(Polarity::Bearish)),
    };
    let candle_flags = CandleFlags {
        inside_bar: has(PatternKind::InsideBar, None),
        outside_bar: has(PatternKind::OutsideBar, None),
        big_range: has(PatternKind::BigRange, None),
    };

    let mut score = 0.0;
    let mut reasons: Vec<String> = Vec::new();
    let mut add = |weight: f64, reason: &str| {
        score += weight;
        reasons.push(reason.to_string());
    };

    if indicators.ema20 > indicators.ema50 && indicators.ema50 > indicators.ema200 {
        add(TREND_WEIGHT, "strong_uptrend_EMA");
    }
    if indicators.ema20 < indicators.ema50 && indicators.ema50 < indicators.ema200 {
        add(-TREND_WEIGHT, "strong_downtrend_EMA");
    }
    if indicators.rsi14 < RSI_OVERSOLD {
        add(RSI_WEIGHT, "rsi_oversold");
    }
    if indicators.rsi14 > RSI_OVERBOUGHT {
        add(-RSI_WEIGHT, "rsi_overbought");
    }
    if payapa.payapa_buy {
        add(PAYAPA_WEIGHT, "payapa_buy");
    }
    if payapa.payapa_sell {
        add(-PAYAPA_WEIGHT, "payapa_sell");
    }
    match structure.as_ref().and_then(|s| s.bos) {
        Some(Polarity::Bullish) => add(STRUCTURE_WEIGHT, "bos_bull"),
        Some(Polarity::Bearish) => add(-STRUCTURE_WEIGHT, "bos_bear"),
        _ => {}
    }
    if candle_flags.outside_bar {
        add(OUTSIDE_BAR_WEIGHT, "outside_bar");
    }

    // Weights are tenths; rounding keeps 0.6 + 0.4 from missing the threshold
    let score = round_to(score, 2);
    let (direction, stop_loss, take_profit) = place(
        score_direction(score),
        indicators.close,
        indicators.atr14,
        &mut reasons,
    );

    tracing::debug!(
        "{} {} score {:.2} -> {} ({})",
        symbol,
        timeframe,
        score,
        direction.label(),
        reasons.join(",")
    );

    let plan = TradePlan {
        direction,
        entry: round_to(indicators.close, 2),
        stop_loss,
        take_profit,
        notes: SCORE_NOTES.to_string(),
        reasons: reasons.clone(),
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        confidence: round_to((score.abs() / FULL_CONFIDENCE_SCORE).clamp(0.0, 1.0), 3),
        generated_at: chrono::Utc::now().timestamp_millis(),
    };

    Ok(MarketAnalysis {
        indicators,
        order_blocks: of_kind(PatternKind::OrderBlock),
        fvg: of_kind(PatternKind::FairValueGap),
        structure,
        payapa,
        candle_flags,
        score,
        reasons,
        plan,
    })
}
