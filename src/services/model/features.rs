//! Classifier feature schema and labeled datasets.

use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::services::signals::indicators::{IndicatorFrame, IndicatorRow};

/// Feature columns, in the order the classifier sees them.
pub const FEATURE_NAMES: [&str; 5] = ["return", "ema_20", "ema_50", "rsi_14", "atr_14"];

/// Bumped whenever `FEATURE_NAMES` or their computation changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Minimum labeled rows needed to train.
pub const MIN_TRAINING_ROWS: usize = 200;

/// Names and version of the features a model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub names: Vec<String>,
    pub version: u32,
}

impl FeatureSchema {
    /// The schema this build computes.
    pub fn current() -> Self {
        Self {
            names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            version: SCHEMA_VERSION,
        }
    }

    pub fn is_current(&self) -> bool {
        *self == Self::current()
    }
}

/// Feature vector for one frame row.
pub fn feature_vector(row: &IndicatorRow) -> [f64; 5] {
    [row.ret, row.ema20, row.ema50, row.rsi14, row.atr14]
}

/// Feature matrix with next-bar direction labels (1 = next close higher).
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl Dataset {
    /// Label every row but the last, which has no next bar.
    pub fn from_frame(frame: &IndicatorFrame) -> Self {
        let rows = frame.rows();
        let labeled = rows.len().saturating_sub(1);

        let mut features = Array2::<f64>::zeros((labeled, FEATURE_NAMES.len()));
        let mut labels = Array1::<f64>::zeros(labeled);
        for (i, pair) in rows.windows(2).enumerate() {
            for (j, value) in feature_vector(&pair[0]).into_iter().enumerate() {
                features[[i, j]] = value;
            }
            labels[i] = if pair[1].bar.close > pair[0].bar.close {
                1.0
            } else {
                0.0
            };
        }

        Self { features, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Chronological split: the first `ratio` share of rows, then the rest.
    pub fn split(&self, ratio: f64) -> (Dataset, Dataset) {
        let cut = ((self.len() as f64) * ratio) as usize;
        let head = Dataset {
            features: self.features.slice(s![..cut, ..]).to_owned(),
            labels: self.labels.slice(s![..cut]).to_owned(),
        };
        let tail = Dataset {
            features: self.features.slice(s![cut.., ..]).to_owned(),
            labels: self.labels.slice(s![cut..]).to_owned(),
        };
        (head, tail)
    }
}
