//! Fetch → indicators → detectors/classifier → trade plan.

use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::model::{ModelStore, TrainedModel, TrainingMetrics};
use crate::services::signals::{
    all_detectors, detect_all, probability_plan, score_analysis, Detector, FrameProfile,
    IndicatorFrame,
};
use crate::sources::MarketData;
use crate::types::{MarketAnalysis, Series, StrategyToggles, TradePlan};

/// Days of history fetched to compute features for a single prediction.
pub const INFERENCE_LOOKBACK_DAYS: u32 = 30;

/// Run the heuristic pipeline over a series.
pub fn analyze_series(
    series: &Series,
    detectors: &[Box<dyn Detector>],
    toggles: &StrategyToggles,
    symbol: &str,
    timeframe: &str,
) -> Result<MarketAnalysis> {
    let frame = IndicatorFrame::compute(series, FrameProfile::Extended)?;
    let observations = detect_all(detectors, &frame, toggles);
    score_analysis(&frame, &observations, symbol, timeframe)
}

/// Signal generation over the configured market data and model store.
pub struct SignalService {
    market_data: MarketData,
    models: Arc<dyn ModelStore>,
    detectors: Vec<Box<dyn Detector>>,
}

impl SignalService {
    pub fn new(market_data: MarketData, models: Arc<dyn ModelStore>) -> Self {
        Self {
            market_data,
            models,
            detectors: all_detectors(),
        }
    }

    pub fn market_data(&self) -> &MarketData {
        &self.market_data
    }

    /// Fetch `period_days` of history, fit a classifier and persist it.
    ///
    /// Fitting runs on the blocking pool. Nothing is written if training fails.
    pub async fn train(
        &self,
        symbol: &str,
        interval: &str,
        period_days: u32,
    ) -> Result<TrainingMetrics> {
        let series = self.market_data.fetch(symbol, interval, period_days).await?;
        info!(
            "Training {} {} classifier on {} bars ({} days)",
            symbol,
            interval,
            series.len(),
            period_days
        );

        let models = self.models.clone();
        let (symbol, interval) = (symbol.to_string(), interval.to_string());
        tokio::task::spawn_blocking(move || -> Result<TrainingMetrics> {
            let model = TrainedModel::train(&series, &symbol, &interval)?;
            models.save(&model)?;
            Ok(model.metrics)
        })
        .await
        .map_err(|e| AppError::Internal(format!("training task failed: {}", e)))?
    }

    /// Probability-mode plan from the stored model and the latest bar.
    pub async fn predict(&self, symbol: &str, interval: &str) -> Result<TradePlan> {
        let model = self.models.load(symbol, interval)?;
        let series = self
            .market_data
            .fetch(symbol, interval, INFERENCE_LOOKBACK_DAYS)
            .await?;
        let (row, prob_up) = model.predict_latest(&series)?;

        info!("{} {} prob_up {:.3} (model {})", symbol, interval, prob_up, model.id);
        Ok(probability_plan(
            row.bar.close,
            row.atr14,
            prob_up,
            symbol,
            interval,
        ))
    }

    /// Score-mode analysis over `period_days` of history.
    pub async fn analyze_market(
        &self,
        symbol: &str,
        interval: &str,
        period_days: u32,
        toggles: &StrategyToggles,
    ) -> Result<MarketAnalysis> {
        let series = self.market_data.fetch(symbol, interval, period_days).await?;
        let analysis = analyze_series(&series, &self.detectors, toggles, symbol, interval)?;
        info!(
            "{} {} analysis: score {:.2} -> {}",
            symbol,
            interval,
            analysis.score,
            analysis.plan.direction.label()
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::model::test_support::wavy_series;
    use crate::services::model::FileModelStore;

    fn service(series: Series, dir: &std::path::Path) -> SignalService {
        SignalService::new(
            MarketData::Fixed(Arc::new(series)),
            Arc::new(FileModelStore::new(dir).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_predict_before_train() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(wavy_series(300), dir.path());
        assert!(matches!(
            service.predict("XAUUSD=X", "1h").await,
            Err(AppError::ModelNotFound)
        ));
    }

    #[tokio::test]
    async fn test_train_then_predict() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(wavy_series(400), dir.path());

        let metrics = service.train("XAUUSD=X", "1h", 180).await.unwrap();
        assert_eq!(metrics.train_samples + metrics.test_samples, 400 - 49 - 1);

        let plan = service.predict("XAUUSD=X", "1h").await.unwrap();
        assert_eq!(plan.symbol, "XAUUSD=X");
        assert_eq!(plan.timeframe, "1h");
        assert!((0.0..=1.0).contains(&plan.confidence));
    }

    #[tokio::test]
    async fn test_short_training_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(wavy_series(120), dir.path());
        assert!(matches!(
            service.train("XAUUSD=X", "1h", 180).await,
            Err(AppError::InsufficientData(_))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_market() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(wavy_series(300), dir.path());
        let analysis = service
            .analyze_market("XAUUSD=X", "1h", 365, &StrategyToggles::default())
            .await
            .unwrap();
        assert_eq!(analysis.plan.reasons, analysis.reasons);
        assert!(analysis.structure.is_some());

        let off = StrategyToggles {
            choch: false,
            ..StrategyToggles::default()
        };
        let gated = service
            .analyze_market("XAUUSD=X", "1h", 365, &off)
            .await
            .unwrap();
        assert!(gated.structure.is_none());
    }
}
