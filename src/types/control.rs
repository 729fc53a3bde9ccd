//! Operator-facing settings held in application state.

use serde::{Deserialize, Serialize};

/// Risk limits configured by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSettings {
    /// Percent of equity risked per trade.
    pub risk_per_trade: f64,
    /// Maximum drawdown percent before the bot should stand down.
    pub max_drawdown: f64,
    pub max_trades_per_day: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            risk_per_trade: 1.0,
            max_drawdown: 10.0,
            max_trades_per_day: 5,
        }
    }
}

impl RiskSettings {
    /// Reject negative or non-finite percentages.
    pub fn validate(&self) -> Result<(), String> {
        if !self.risk_per_trade.is_finite() || self.risk_per_trade < 0.0 {
            return Err("risk_per_trade must be a non-negative number".to_string());
        }
        if !self.max_drawdown.is_finite() || self.max_drawdown < 0.0 {
            return Err("max_drawdown must be a non-negative number".to_string());
        }
        Ok(())
    }
}

/// Which heuristic detectors feed the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyToggles {
    pub order_blocks: bool,
    pub fvg: bool,
    /// Structure breaks (BOS / CHoCH).
    pub choch: bool,
    pub candle_range: bool,
}

impl Default for StrategyToggles {
    fn default() -> Self {
        Self {
            order_blocks: true,
            fvg: true,
            choch: true,
            candle_range: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub total_trades: u64,
    pub win_rate: f64,
    pub profit_percent: f64,
    pub missed_trades: u64,
}
