use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where price bars come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Yahoo Finance chart API.
    Yahoo,
    /// The live-terminal bridge at `BRIDGE_URL`.
    Bridge,
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(DataSource::Yahoo),
            "bridge" | "mt5" => Ok(DataSource::Bridge),
            other => Err(format!("unknown data source '{}'", other)),
        }
    }
}

/// Outbound HTTP settings shared by every client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt on connect/timeout/5xx failures.
    pub max_retries: u32,
    /// First retry delay in milliseconds, doubled on each further retry.
    pub base_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            base_delay_ms: 500,
        }
    }
}

/// Telegram alert credentials. Alerts are skipped unless both are set.
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Operator login accepted by `POST /login`.
    pub login_username: String,
    pub login_password: String,
    /// Directory holding trained models.
    pub model_dir: PathBuf,
    pub data_source: DataSource,
    /// Base URL of the terminal bridge, e.g. `http://127.0.0.1:9000`.
    pub bridge_url: Option<String>,
    pub telegram: TelegramConfig,
    pub fetch: FetchConfig,
    /// Symbol used when a request names none.
    pub default_symbol: String,
    pub default_interval: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = FetchConfig::default();

        let data_source = match get("DATA_SOURCE").map(|v| v.parse::<DataSource>()) {
            Some(Ok(source)) => source,
            Some(Err(e)) => {
                tracing::warn!("{}, falling back to yahoo", e);
                DataSource::Yahoo
            }
            None => DataSource::Yahoo,
        };

        Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            login_username: get("LOGIN_USERNAME").unwrap_or_else(|| "chuks fx".to_string()),
            login_password: get("LOGIN_PASSWORD").unwrap_or_else(|| "2345678901".to_string()),
            model_dir: get("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("models")),
            data_source,
            bridge_url: get("BRIDGE_URL").map(|u| u.trim_end_matches('/').to_string()),
            telegram: TelegramConfig {
                bot_token: get("TELEGRAM_BOT_TOKEN"),
                chat_id: get("TELEGRAM_CHAT_ID"),
            },
            fetch: FetchConfig {
                timeout_secs: get("FETCH_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.timeout_secs),
                max_retries: get("FETCH_MAX_RETRIES")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.max_retries),
                base_delay_ms: defaults.base_delay_ms,
            },
            default_symbol: get("DEFAULT_SYMBOL").unwrap_or_else(|| "XAUUSD=X".to_string()),
            default_interval: get("DEFAULT_INTERVAL").unwrap_or_else(|| "1h".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
