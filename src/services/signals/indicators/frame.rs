//! Series plus aligned indicator columns.

use serde::Serialize;

use super::{atr, ema, macd, pct_change, rsi, MacdParams};
use crate::error::{AppError, Result};
use crate::types::{Bar, Series};

pub const EMA_FAST: usize = 20;
pub const EMA_SLOW: usize = 50;
pub const EMA_TREND: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;

/// Which columns a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameProfile {
    /// Return, EMA 20/50, RSI 14, ATR 14.
    Classifier,
    /// Classifier columns plus EMA 200 and MACD line/signal.
    Extended,
}

impl FrameProfile {
    /// Index of the first row where every column of this profile is defined.
    pub fn warmup(&self) -> usize {
        let base = (EMA_SLOW - 1).max(RSI_PERIOD).max(ATR_PERIOD).max(1);
        match self {
            FrameProfile::Classifier => base,
            FrameProfile::Extended => base.max(EMA_TREND - 1).max(MacdParams::default().warmup()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtendedColumns {
    pub ema200: f64,
    pub macd: f64,
    pub macd_signal: f64,
}

/// One bar with every derived value of its profile defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: Bar,
    pub ret: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub rsi14: f64,
    pub atr14: f64,
    #[serde(flatten)]
    pub extended: Option<ExtendedColumns>,
}

#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    profile: FrameProfile,
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    /// Compute all columns for `profile` and drop warm-up rows.
    ///
    /// Fails with `InsufficientData` if no row survives.
    pub fn compute(series: &Series, profile: FrameProfile) -> Result<Self> {
        let bars = series.bars();
        let closes = series.closes();

        let ret = pct_change(&closes);
        let ema20 = ema(&closes, EMA_FAST);
        let ema50 = ema(&closes, EMA_SLOW);
        let rsi14 = rsi(&closes, RSI_PERIOD);
        let atr14 = atr(bars, ATR_PERIOD);

        let (ema200, macd) = match profile {
            FrameProfile::Classifier => (None, None),
            FrameProfile::Extended => (
                Some(ema(&closes, EMA_TREND)),
                Some(macd(&closes, MacdParams::default())),
            ),
        };

        let rows: Vec<IndicatorRow> = bars
            .iter()
            .enumerate()
            .filter_map(|(i, bar)| {
                let extended = match (&ema200, &macd) {
                    (Some(ema200), Some(macd)) => Some(ExtendedColumns {
                        ema200: ema200[i]?,
                        macd: macd.line[i]?,
                        macd_signal: macd.signal[i]?,
                    }),
                    _ => None,
                };
                if profile == FrameProfile::Extended && extended.is_none() {
                    return None;
                }
                Some(IndicatorRow {
                    bar: *bar,
                    ret: ret[i]?,
                    ema20: ema20[i]?,
                    ema50: ema50[i]?,
                    rsi14: rsi14[i]?,
                    atr14: atr14[i]?,
                    extended,
                })
            })
            .collect();

        if rows.is_empty() {
            return Err(AppError::InsufficientData(format!(
                "{} bars leave no rows after indicator warm-up (need more than {})",
                bars.len(),
                profile.warmup()
            )));
        }

        Ok(Self { profile, rows })
    }

    /// Assemble a frame from precomputed rows.
    #[cfg(test)]
    pub(crate) fn from_rows(profile: FrameProfile, rows: Vec<IndicatorRow>) -> Self {
        Self { profile, rows }
    }

    pub fn profile(&self) -> FrameProfile {
        self.profile
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> + '_ {
        self.rows.iter().map(|r| &r.bar)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.bar.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.bar.low).collect()
    }
}
