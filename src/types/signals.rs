use serde::{Deserialize, Serialize};

/// Direction of a trade plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
    Flat,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
            Direction::Flat => "FLAT",
        }
    }
}

/// Polarity of a structural observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Bullish,
    Bearish,
    Neutral,
}

/// What a detector found.
///
/// `InsideBar`, `OutsideBar` and `BigRange` are the three range flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    OrderBlock,
    FairValueGap,
    StructureBreak,
    InsideBar,
    OutsideBar,
    BigRange,
    MomentumExtreme,
}

impl PatternKind {
    pub fn is_range_flag(&self) -> bool {
        matches!(
            self,
            PatternKind::InsideBar | PatternKind::OutsideBar | PatternKind::BigRange
        )
    }
}

/// A structural finding over one analysis frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternObservation {
    pub kind: PatternKind,
    pub polarity: Polarity,
    /// Frame row the observation is anchored on.
    pub index: usize,
    /// Timestamp (seconds) of the first bar involved.
    pub start: i64,
    /// Timestamp (seconds) of the last bar involved.
    pub end: i64,
    pub low: f64,
    pub high: f64,
}

/// A directional recommendation. Built once per analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub notes: String,
    /// Names of the rules that fired, in evaluation order.
    #[serde(default)]
    pub reasons: Vec<String>,
    pub symbol: String,
    pub timeframe: String,
    pub confidence: f64,
    /// Milliseconds since epoch.
    pub generated_at: i64,
}

/// Latest-row indicator values reported with an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub rsi14: f64,
    pub atr14: f64,
    pub macd: f64,
    pub macd_signal: f64,
}

/// Break-of-structure summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSummary {
    pub bos: Option<Polarity>,
    pub last_high: f64,
    pub last_low: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayapaFlags {
    pub payapa_buy: bool,
    pub payapa_sell: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleFlags {
    pub inside_bar: bool,
    pub outside_bar: bool,
    pub big_range: bool,
}

/// Full heuristic analysis: indicator state, detector output, score and plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub indicators: IndicatorSnapshot,
    pub order_blocks: Vec<PatternObservation>,
    pub fvg: Vec<PatternObservation>,
    pub structure: Option<StructureSummary>,
    pub payapa: PayapaFlags,
    pub candle_flags: CandleFlags,
    pub score: f64,
    pub reasons: Vec<String>,
    pub plan: TradePlan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Direction::Flat).unwrap(), "\"FLAT\"");
        let d: Direction = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(d, Direction::Sell);
        assert_eq!(d.label(), "SELL");
    }

    #[test]
    fn test_pattern_kind_range_flags() {
        assert!(PatternKind::InsideBar.is_range_flag());
        assert!(PatternKind::BigRange.is_range_flag());
        assert!(!PatternKind::OrderBlock.is_range_flag());
        assert_eq!(
            serde_json::to_string(&PatternKind::FairValueGap).unwrap(),
            "\"fair_value_gap\""
        );
    }

    #[test]
    fn test_trade_plan_serializes_missing_levels_as_null() {
        let plan = TradePlan {
            direction: Direction::Flat,
            entry: 2000.0,
            stop_loss: None,
            take_profit: None,
            notes: "n".to_string(),
            reasons: vec![],
            symbol: "XAUUSD=X".to_string(),
            timeframe: "1h".to_string(),
            confidence: 0.5,
            generated_at: 0,
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["direction"], "FLAT");
        assert!(json["stop_loss"].is_null());
        assert!(json["take_profit"].is_null());
    }
}
