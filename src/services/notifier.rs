//! Telegram trade alerts.

use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{FetchConfig, TelegramConfig};
use crate::error::{AppError, Result};
use crate::sources::http_client;
use crate::types::TradePlan;

const TELEGRAM_API: &str = "https://api.telegram.org";

/// What happened to an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifyOutcome {
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    credentials: Option<(String, String)>,
}

fn format_level(level: Option<f64>) -> String {
    level.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// Alert text for a plan.
pub fn format_message(plan: &TradePlan) -> String {
    format!(
        "📈 Aurum Signal\nSymbol: {}\nTF: {}\nDirection: {}\nEntry: {:.2}\nSL: {}\nTP: {}\nConfidence: {}",
        plan.symbol,
        plan.timeframe,
        plan.direction.label(),
        plan.entry,
        format_level(plan.stop_loss),
        format_level(plan.take_profit),
        plan.confidence
    )
}

impl TelegramNotifier {
    pub fn new(telegram: &TelegramConfig, fetch: &FetchConfig) -> Result<Self> {
        let credentials = match (&telegram.bot_token, &telegram.chat_id) {
            (Some(token), Some(chat)) => Some((token.clone(), chat.clone())),
            _ => None,
        };
        Ok(Self {
            client: http_client(Duration::from_secs(fetch.timeout_secs))?,
            api_base: TELEGRAM_API.to_string(),
            credentials,
        })
    }

    /// Point the notifier at another API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Send one alert.
    ///
    /// Without credentials nothing is sent. A non-2xx reply is reported as
    /// `sent: false`; only a transport failure is an error.
    pub async fn notify(&self, plan: &TradePlan) -> Result<NotifyOutcome> {
        let Some((token, chat_id)) = &self.credentials else {
            return Ok(NotifyOutcome {
                sent: false,
                reason: Some("Missing TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID".to_string()),
                status_code: None,
            });
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": format_message(plan) }))
            .send()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Telegram request failed: {}", e.without_url())))?;

        let status = response.status();
        if status.is_success() {
            info!("Sent {} {} alert to Telegram", plan.symbol, plan.direction.label());
        } else {
            warn!("Telegram rejected alert: {}", status);
        }

        Ok(NotifyOutcome {
            sent: status.is_success(),
            reason: None,
            status_code: Some(status.as_u16()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use axum::{extract::Path, http::StatusCode, routing::post, Router};

    fn plan() -> TradePlan {
        TradePlan {
            direction: Direction::Buy,
            entry: 2000.0,
            stop_loss: Some(1988.0),
            take_profit: None,
            notes: String::new(),
            reasons: vec![],
            symbol: "XAUUSD=X".to_string(),
            timeframe: "1h".to_string(),
            confidence: 0.612,
            generated_at: 0,
        }
    }

    fn telegram(token: Option<&str>, chat: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(str::to_string),
            chat_id: chat.map(str::to_string),
        }
    }

    #[test]
    fn test_format_message() {
        let text = format_message(&plan());
        assert!(text.contains("Direction: BUY"));
        assert!(text.contains("Entry: 2000.00"));
        assert!(text.contains("SL: 1988.00"));
        assert!(text.contains("TP: -"));
        assert!(text.contains("Confidence: 0.612"));
    }

    #[tokio::test]
    async fn test_unconfigured_is_a_no_op() {
        let notifier =
            TelegramNotifier::new(&telegram(Some("token"), None), &FetchConfig::default()).unwrap();
        assert!(!notifier.is_configured());
        let outcome = notifier.notify(&plan()).await.unwrap();
        assert!(!outcome.sent);
        assert!(outcome.reason.unwrap().contains("TELEGRAM_CHAT_ID"));
    }

    #[tokio::test]
    async fn test_status_code_is_reported() {
        let app = Router::new().route(
            "/:bot/sendMessage",
            post(|Path(bot): Path<String>| async move {
                if bot == "botgood" {
                    StatusCode::OK
                } else {
                    StatusCode::UNAUTHORIZED
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let base = format!("http://{}", addr);

        let good = TelegramNotifier::new(&telegram(Some("good"), Some("1")), &FetchConfig::default())
            .unwrap()
            .with_api_base(&base);
        assert_eq!(
            good.notify(&plan()).await.unwrap(),
            NotifyOutcome {
                sent: true,
                reason: None,
                status_code: Some(200)
            }
        );

        let bad = TelegramNotifier::new(&telegram(Some("bad"), Some("1")), &FetchConfig::default())
            .unwrap()
            .with_api_base(&base);
        let outcome = bad.notify(&plan()).await.unwrap();
        assert!(!outcome.sent);
        assert_eq!(outcome.status_code, Some(401));
    }
}
