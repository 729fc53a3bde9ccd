//! Wire types for the trading-terminal bridge.

use serde::{Deserialize, Serialize};

use super::Bar;

/// Terminal candle timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    /// Parse a terminal code ("H1") or a provider interval ("1h").
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "m1" | "1m" => Some(Self::M1),
            "m5" | "5m" => Some(Self::M5),
            "m15" | "15m" => Some(Self::M15),
            "m30" | "30m" => Some(Self::M30),
            "h1" | "1h" | "60m" => Some(Self::H1),
            "h4" | "4h" => Some(Self::H4),
            "d1" | "1d" => Some(Self::D1),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D1",
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::M5 => 300,
            Self::M15 => 900,
            Self::M30 => 1_800,
            Self::H1 => 3_600,
            Self::H4 => 14_400,
            Self::D1 => 86_400,
        }
    }

    /// Bars per calendar day.
    pub fn bars_per_day(&self) -> u32 {
        (86_400 / self.seconds()) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub initialized: bool,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub login: String,
    pub password: String,
    pub server: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub connected: bool,
    pub login: String,
    pub server: String,
}

/// Top-of-book quote. `time` is seconds since epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
    pub time: i64,
}

/// One terminal candle. `time` is seconds since epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeCandle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub tick_volume: u64,
}

impl From<&BridgeCandle> for Bar {
    fn from(c: &BridgeCandle) -> Self {
        Bar::new(c.time, c.open, c.high, c.low, c.close, c.tick_volume as f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandlesResponse {
    pub symbol: String,
    pub timeframe: String,
    pub count: usize,
    pub candles: Vec<BridgeCandle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_parsing() {
        assert_eq!(Timeframe::from_str("H1"), Some(Timeframe::H1));
        assert_eq!(Timeframe::from_str("1h"), Some(Timeframe::H1));
        assert_eq!(Timeframe::from_str("m15"), Some(Timeframe::M15));
        assert_eq!(Timeframe::from_str("d1"), Some(Timeframe::D1));
        assert_eq!(Timeframe::from_str("W1"), None);
    }

    #[test]
    fn test_timeframe_bars_per_day() {
        assert_eq!(Timeframe::H1.bars_per_day(), 24);
        assert_eq!(Timeframe::M5.bars_per_day(), 288);
        assert_eq!(Timeframe::D1.bars_per_day(), 1);
    }

    #[test]
    fn test_candles_response_deserialization() {
        let json = r#"{
            "symbol": "XAUUSD",
            "timeframe": "H1",
            "count": 1,
            "candles": [
                {"time": 1700000000, "open": 1990.5, "high": 1995.0, "low": 1988.0, "close": 1993.2, "tick_volume": 1200}
            ]
        }"#;
        let resp: CandlesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.count, 1);
        let bar = Bar::from(&resp.candles[0]);
        assert_eq!(bar.time, 1_700_000_000);
        assert_eq!(bar.volume, 1200.0);
    }

    #[test]
    fn test_bridge_status_failure_shape() {
        let json = r#"{"initialized": false, "error": "MT5 initialize() failed"}"#;
        let status: BridgeStatus = serde_json::from_str(json).unwrap();
        assert!(!status.initialized);
        assert!(status.login.is_none());
        assert!(status.error.unwrap().contains("initialize"));
    }
}
