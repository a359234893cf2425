use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Account status as stored in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Banned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Banned => "banned",
        }
    }

    pub fn parse(s: &str) -> AccountStatus {
        match s {
            "banned" => AccountStatus::Banned,
            _ => AccountStatus::Active,
        }
    }
}

/// A user account in the rewards ledger, keyed by the caller-supplied
/// Telegram id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub points: i64,
    /// One-shot referral binding; never overwritten once set, never the
    /// account's own id.
    pub referred_by: Option<i64>,
    pub ads_watched_today: i32,
    pub last_ad_date: Option<NaiveDate>,
    /// Claim-key cache: bare task ids (legacy) or `"<task_id>:<date>"`
    /// dated keys. Redundant with the completion log by design.
    pub completed_tasks: Vec<String>,
    pub status: AccountStatus,
    pub account_age_days: i32,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(telegram_id: i64, username: Option<&str>, referred_by: Option<i64>) -> Self {
        Self {
            telegram_id,
            username: username.map(String::from),
            points: 0,
            referred_by,
            ads_watched_today: 0,
            last_ad_date: None,
            completed_tasks: Vec::new(),
            status: AccountStatus::Active,
            account_age_days: 0,
            created_at: Utc::now(),
        }
    }
}
