//! Outbound Telegram messaging.
//!
//! Ledger handlers never wait on a send: everything goes through
//! [`send_fire_and_forget`], which spawns the call and logs failures.
//! Only startup-time webhook registration surfaces its error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::http::HttpClient;
use crate::Error;

/// Outbound message delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), Error>;
}

/// Telegram Bot API notifier.
pub struct TelegramNotifier {
    http: Arc<dyn HttpClient>,
    bot_token: String,
}

impl TelegramNotifier {
    pub fn new(http: Arc<dyn HttpClient>, bot_token: &str) -> Self {
        Self {
            http,
            bot_token: bot_token.to_string(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    /// Register `<base_url>/bot/webhook` as the update webhook.
    pub async fn set_webhook(&self, base_url: &str) -> Result<(), Error> {
        let url = format!("{}/bot/webhook", base_url.trim_end_matches('/'));
        self.http
            .post_json(self.api_url("setWebhook"), json!({ "url": url }))
            .await?;
        info!("Registered Telegram webhook at {}", url);
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), Error> {
        self.http
            .post_json(
                self.api_url("sendMessage"),
                json!({ "chat_id": chat_id, "text": text }),
            )
            .await?;
        Ok(())
    }
}

/// Fire-and-forget send. Delivery failures are logged and swallowed;
/// the HTTP response to the user never depends on them.
pub fn send_fire_and_forget(notifier: Arc<dyn Notifier>, chat_id: i64, text: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_message(chat_id, &text).await {
            warn!(chat_id, "notifier send failed: {}", e);
        }
    });
}

/// Minimal slice of a Telegram update, enough for command handling.
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}
