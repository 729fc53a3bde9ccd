//! Next-bar direction classifier: training, inference and persistence.

pub mod features;
pub mod logistic;
pub mod store;

pub use features::{Dataset, FeatureSchema, FEATURE_NAMES, MIN_TRAINING_ROWS, SCHEMA_VERSION};
pub use logistic::{FitParams, LogisticRegression, Standardizer};
pub use store::{FileModelStore, ModelStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::signals::aggregator::round_to;
use crate::services::signals::indicators::{FrameProfile, IndicatorFrame, IndicatorRow};
use crate::types::Series;

/// Share of labeled rows used for fitting; the rest is held out.
const TRAIN_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Hold-out accuracy, 4 decimals.
    pub accuracy: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// A fitted classifier with everything needed to reuse it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub id: Uuid,
    pub symbol: String,
    pub interval: String,
    pub schema: FeatureSchema,
    pub standardizer: Standardizer,
    pub classifier: LogisticRegression,
    pub metrics: TrainingMetrics,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Fit a classifier on `series`.
    ///
    /// Fails with `InsufficientData` when fewer than `MIN_TRAINING_ROWS`
    /// labeled rows survive the indicator warm-up.
    pub fn train(series: &Series, symbol: &str, interval: &str) -> Result<Self> {
        let frame = IndicatorFrame::compute(series, FrameProfile::Classifier)?;
        let data = Dataset::from_frame(&frame);
        if data.len() < MIN_TRAINING_ROWS {
            return Err(AppError::InsufficientData(format!(
                "Not enough data to train: {} labeled rows, need {}. Try increasing period_days.",
                data.len(),
                MIN_TRAINING_ROWS
            )));
        }

        let (train, test) = data.split(TRAIN_RATIO);
        let standardizer = Standardizer::fit(&train.features);
        let classifier = LogisticRegression::fit(
            &standardizer.transform(&train.features),
            &train.labels,
            FitParams::default(),
        );
        let predicted = classifier.predict(&standardizer.transform(&test.features));
        let metrics = TrainingMetrics {
            accuracy: round_to(logistic::accuracy(&predicted, &test.labels), 4),
            train_samples: train.len(),
            test_samples: test.len(),
        };

        info!(
            "Trained {} {} classifier: accuracy {} on {} held-out rows ({} training)",
            symbol, interval, metrics.accuracy, metrics.test_samples, metrics.train_samples
        );

        Ok(Self {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            schema: FeatureSchema::current(),
            standardizer,
            classifier,
            metrics,
            trained_at: Utc::now(),
        })
    }

    /// Probability that the bar after `row` closes higher.
    pub fn prob_up(&self, row: &IndicatorRow) -> f64 {
        let x = self.standardizer.transform_row(&features::feature_vector(row));
        self.classifier.predict_proba_row(x.view())
    }

    /// Latest frame row of `series` and its up-probability.
    pub fn predict_latest(&self, series: &Series) -> Result<(IndicatorRow, f64)> {
        let frame = IndicatorFrame::compute(series, FrameProfile::Classifier).map_err(|_| {
            AppError::InsufficientData("Insufficient data to compute features.".to_string())
        })?;
        let row = *frame
            .last()
            .ok_or_else(|| AppError::InsufficientData("Insufficient data to compute features.".to_string()))?;
        Ok((row, self.prob_up(&row)))
    }
}
