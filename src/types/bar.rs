use serde::{Deserialize, Serialize};
use tracing::debug;

/// One OHLCV sample. `time` is seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute distance between open and close.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Check `low <= min(open, close) <= max(open, close) <= high` and that every
    /// price is finite.
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return false;
        }
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

/// Time-ordered bars with strictly increasing timestamps.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series from raw provider bars.
    ///
    /// Bars are sorted by time; for duplicated timestamps the last one wins.
    /// Bars that break the OHLC invariant are dropped.
    pub fn from_bars(mut raw: Vec<Bar>) -> Self {
        let total = raw.len();
        raw.sort_by_key(|b| b.time);

        let mut bars: Vec<Bar> = Vec::with_capacity(raw.len());
        for bar in raw {
            if !bar.is_valid() {
                continue;
            }
            match bars.last_mut() {
                Some(last) if last.time == bar.time => *last = bar,
                _ => bars.push(bar),
            }
        }

        if bars.len() != total {
            debug!(
                "Normalized series: kept {} of {} bars (invalid or duplicate)",
                bars.len(),
                total
            );
        }

        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
