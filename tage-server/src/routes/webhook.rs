// tage-server/src/routes/webhook.rs

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

use tage_core::notifier::{send_fire_and_forget, TelegramUpdate};

use crate::context::AppContext;

const START_PROMPT: &str =
    "Welcome to Tage! Open the mini app to start earning points: tap the menu button below.";

/// POST /bot/webhook: inbound Telegram updates. Replies are
/// fire-and-forget; the webhook always acks with 200 so Telegram does
/// not redeliver.
pub async fn bot_webhook(
    State(ctx): State<Arc<AppContext>>,
    Json(update): Json<TelegramUpdate>,
) -> Json<Value> {
    let Some(message) = update.message else {
        return Json(json!({ "ok": true }));
    };

    let is_start = message
        .text
        .as_deref()
        .map(|t| t.starts_with("/start"))
        .unwrap_or(false);

    if is_start {
        if let Some(notifier) = ctx.notifier.clone() {
            send_fire_and_forget(notifier, message.chat.id, START_PROMPT.to_string());
        } else {
            debug!(chat_id = message.chat.id, "ignoring /start: no bot token configured");
        }
    }

    Json(json!({ "ok": true }))
}
