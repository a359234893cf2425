use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record that an account completed a task or action.
/// Never updated once inserted; backs the rolling-24h claim window.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct CompletionRecord {
    pub telegram_id: i64,
    pub task_id: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(telegram_id: i64, task_id: &str) -> Self {
        Self {
            telegram_id,
            task_id: task_id.to_string(),
            completed_at: Utc::now(),
        }
    }
}

/// Best-effort ad-watch log row. A failed insert degrades to a warning
/// and never blocks the reward.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct AdWatchEntry {
    pub telegram_id: i64,
    pub watched_at: DateTime<Utc>,
}

impl AdWatchEntry {
    pub fn new(telegram_id: i64) -> Self {
        Self {
            telegram_id,
            watched_at: Utc::now(),
        }
    }
}
