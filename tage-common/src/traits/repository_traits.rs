use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::error::Error;
use crate::models::account::{Account, AccountStatus};
use crate::models::completion::{AdWatchEntry, CompletionRecord};
use crate::models::milestone::MilestoneClaim;
use crate::models::task::Task;

/// Durable account store. The ledger services only talk to this trait,
/// so they can run against Postgres in production and an in-memory fake
/// in tests. Schema-variant shims (legacy id columns) live behind the
/// implementation, never in the services.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, account: &Account) -> Result<(), Error>;
    async fn get(&self, telegram_id: i64) -> Result<Option<Account>, Error>;

    async fn update_username(&self, telegram_id: i64, username: &str) -> Result<(), Error>;

    /// One-shot referral binding. Returns true if the referrer was bound
    /// by this call, false if `referred_by` was already set.
    async fn bind_referrer(&self, telegram_id: i64, referrer_id: i64) -> Result<bool, Error>;

    /// Increment `points` by `amount`. Implementations should prefer an
    /// atomic in-store increment; a read-then-write fallback loses
    /// updates under concurrent calls.
    async fn add_points(&self, telegram_id: i64, amount: i64) -> Result<(), Error>;

    async fn set_completed_tasks(&self, telegram_id: i64, keys: &[String]) -> Result<(), Error>;

    async fn set_ad_counter(
        &self,
        telegram_id: i64,
        watched_today: i32,
        last_ad_date: NaiveDate,
    ) -> Result<(), Error>;

    async fn set_status(&self, telegram_id: i64, status: AccountStatus) -> Result<(), Error>;

    async fn count_referrals(&self, telegram_id: i64) -> Result<i64, Error>;

    async fn top_by_points(&self, limit: i64) -> Result<Vec<Account>, Error>;

    async fn list_all(&self) -> Result<Vec<Account>, Error>;
}

/// Append-only completion log used for the rolling idempotency window.
#[async_trait]
pub trait CompletionLogRepository: Send + Sync {
    async fn append(&self, record: &CompletionRecord) -> Result<(), Error>;

    /// True if (account, task) was logged within the trailing `window`.
    async fn claimed_within(
        &self,
        telegram_id: i64,
        task_id: &str,
        window: Duration,
    ) -> Result<bool, Error>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> Result<(), Error>;
    async fn get(&self, task_id: &str) -> Result<Option<Task>, Error>;
    async fn list_all(&self) -> Result<Vec<Task>, Error>;
}

#[async_trait]
pub trait MilestoneRepository: Send + Sync {
    /// Insert a claim row; errors if (account, key) already exists.
    async fn insert(&self, claim: &MilestoneClaim) -> Result<(), Error>;
    async fn exists(&self, telegram_id: i64, milestone_key: &str) -> Result<bool, Error>;
}

/// Best-effort ad-watch log. Callers treat failures as non-fatal.
#[async_trait]
pub trait AdWatchLogRepository: Send + Sync {
    async fn append(&self, entry: &AdWatchEntry) -> Result<(), Error>;
}
