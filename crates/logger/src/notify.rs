//! Push alerts. Everything here is best effort: a failed alert is a `warn!`,
//! never an error for the caller.

use anyhow::Result;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

const TELEGRAM_API: &str = "https://api.telegram.org";
const NTFY_BASE: &str = "https://ntfy.sh";

#[derive(Clone)]
pub struct TelegramTarget {
    pub bot_token: String,
    pub chat_id:   String,
}

impl fmt::Debug for TelegramTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTarget")
            .field("bot_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    pub telegram:   Option<TelegramTarget>,
    pub ntfy_topic: Option<String>,
}

impl NotifyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let telegram = match (non_empty("TELEGRAM_BOT_TOKEN"), non_empty("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramTarget { bot_token, chat_id }),
            (None, None) => None,
            _ => {
                warn!("Telegram needs both TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID, Telegram alerts off");
                None
            }
        };

        Self {
            telegram,
            ntfy_topic: non_empty("NTFY_TOPIC"),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.telegram.is_some() || self.ntfy_topic.is_some()
    }
}

pub struct Notifier {
    client:       reqwest::Client,
    config:       NotifyConfig,
    telegram_api: String,
    ntfy_base:    String,
}

impl Notifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self::with_endpoints(config, TELEGRAM_API, NTFY_BASE)
    }

    pub fn with_endpoints(config: NotifyConfig, telegram_api: impl Into<String>, ntfy_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            config,
            telegram_api: telegram_api.into(),
            ntfy_base:    ntfy_base.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Send `text` to every configured target. Returns how many accepted it.
    pub async fn notify(&self, title: &str, text: &str) -> usize {
        let mut delivered = 0;

        if let Some(target) = &self.config.telegram {
            match tg_send_message(&self.client, &self.telegram_api, target, text).await {
                Ok(msg_id) => {
                    info!("Telegram alert sent (message_id {})", msg_id);
                    delivered += 1;
                }
                Err(e) => warn!("Telegram alert failed: {}", e),
            }
        }

        if let Some(topic) = &self.config.ntfy_topic {
            match ntfy_publish(&self.client, &self.ntfy_base, topic, title, text).await {
                Ok(()) => {
                    info!("NTFY sent: {}", title);
                    delivered += 1;
                }
                Err(e) => warn!("NTFY failed: {}", e),
            }
        }

        delivered
    }
}

async fn tg_send_message(client: &reqwest::Client, api_base: &str, target: &TelegramTarget, text: &str) -> Result<i64> {
    let url = format!("{}/bot{}/sendMessage", api_base, target.bot_token);
    let body = serde_json::json!({
        "chat_id": target.chat_id,
        "text": text,
        "disable_web_page_preview": true,
    });
    let resp = client.post(&url).json(&body).send().await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        anyhow::bail!("Telegram sendMessage failed: {} {}", status, snippet);
    }
    let resp_json: serde_json::Value = resp.json().await?;
    Ok(resp_json["result"]["message_id"].as_i64().unwrap_or(0))
}

async fn ntfy_publish(client: &reqwest::Client, base: &str, topic: &str, title: &str, text: &str) -> Result<()> {
    let resp = client
        .post(format!("{}/{}", base, topic))
        .header("Title", title)
        .header("Priority", "high")
        .header("Tags", "soccer")
        .body(text.to_string())
        .send()
        .await?;
    if !resp.status().is_success() {
        anyhow::bail!("NTFY HTTP {}", resp.status());
    }
    Ok(())
}
