//! Shared application state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::services::{FileModelStore, ModelStore, SignalService, TelegramNotifier};
use crate::sources::{BridgeClient, MarketData};
use crate::types::{PerformanceSnapshot, RiskSettings, StrategyToggles};

/// Operator-controlled flags and settings.
#[derive(Default)]
pub struct ControlState {
    running: AtomicBool,
    risk: RwLock<RiskSettings>,
    strategies: RwLock<StrategyToggles>,
    performance: RwLock<PerformanceSnapshot>,
}

impl ControlState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Set the running flag, returning the previous value.
    pub fn set_running(&self, running: bool) -> bool {
        self.running.swap(running, Ordering::SeqCst)
    }

    pub async fn risk(&self) -> RiskSettings {
        self.risk.read().await.clone()
    }

    pub async fn set_risk(&self, risk: RiskSettings) {
        *self.risk.write().await = risk;
    }

    pub async fn strategies(&self) -> StrategyToggles {
        *self.strategies.read().await
    }

    pub async fn set_strategies(&self, toggles: StrategyToggles) {
        *self.strategies.write().await = toggles;
    }

    pub async fn performance(&self) -> PerformanceSnapshot {
        self.performance.read().await.clone()
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub control: Arc<ControlState>,
    pub signals: Arc<SignalService>,
    pub notifier: Arc<TelegramNotifier>,
    /// Present when `BRIDGE_URL` is configured.
    pub bridge: Option<Arc<BridgeClient>>,
}

impl AppState {
    /// Build every collaborator from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let market_data = MarketData::from_config(&config)?;
        Self::with_market_data(config, market_data)
    }

    /// Build state around an explicit market data source.
    pub fn with_market_data(config: Config, market_data: MarketData) -> Result<Self> {
        let models: Arc<dyn ModelStore> = Arc::new(FileModelStore::new(&config.model_dir)?);

        let bridge = match (&market_data, &config.bridge_url) {
            (MarketData::Bridge(client), _) => Some(client.clone()),
            (_, Some(url)) => Some(Arc::new(BridgeClient::new(url, &config.fetch)?)),
            _ => None,
        };

        let notifier = TelegramNotifier::new(&config.telegram, &config.fetch)?;
        info!(
            "Market data: {}, models in {}, bridge {}, telegram {}",
            market_data.name(),
            config.model_dir.display(),
            if bridge.is_some() { "configured" } else { "off" },
            if notifier.is_configured() { "configured" } else { "off" },
        );

        Ok(Self {
            signals: Arc::new(SignalService::new(market_data, models)),
            notifier: Arc::new(notifier),
            control: Arc::new(ControlState::default()),
            bridge,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_control_defaults() {
        let control = ControlState::default();
        assert!(!control.is_running());
        assert_eq!(control.risk().await, RiskSettings::default());
        assert_eq!(control.strategies().await, StrategyToggles::default());
        assert_eq!(control.performance().await.total_trades, 0);
    }

    #[tokio::test]
    async fn test_running_flag() {
        let control = ControlState::default();
        assert!(!control.set_running(true));
        assert!(control.is_running());
        assert!(control.set_running(false));
        assert!(!control.is_running());
    }

    #[tokio::test]
    async fn test_settings_are_replaced() {
        let control = ControlState::default();
        let toggles = StrategyToggles {
            fvg: false,
            ..StrategyToggles::default()
        };
        control.set_strategies(toggles).await;
        assert!(!control.strategies().await.fvg);
    }

    #[test]
    fn test_state_with_bridge_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            model_dir: dir.path().to_path_buf(),
            bridge_url: Some("http://127.0.0.1:5001".to_string()),
            ..Config::default()
        };
        let state = AppState::from_config(config).unwrap();
        assert_eq!(state.signals.market_data().name(), "yahoo");
        assert_eq!(state.bridge.unwrap().base_url(), "http://127.0.0.1:5001");
    }
}
