//! In-memory repository implementations.
//!
//! These back the service tests so the ledger rules can be exercised
//! without a live Postgres. They implement the same traits as the
//! Postgres repositories and mimic their observable quirks: the account
//! fake increments points with a read-then-write (the non-atomic
//! fallback path and its lost-update race), and the legacy-id map mirrors
//! the one-time column-migration shim.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use tokio::sync::Mutex;

use tage_common::models::account::{Account, AccountStatus};
use tage_common::models::completion::{AdWatchEntry, CompletionRecord};
use tage_common::models::milestone::MilestoneClaim;
use tage_common::models::task::Task;
use tage_common::traits::repository_traits::{
    AccountRepository, AdWatchLogRepository, CompletionLogRepository, MilestoneRepository,
    TaskRepository,
};
use tage_common::Error;

#[derive(Default)]
pub struct MemoryAccountRepository {
    accounts: Mutex<HashMap<i64, Account>>,
    /// Rows still keyed under the legacy identifier column. A primary
    /// miss falls back here and migrates the row forward, like the
    /// Postgres repository configured with a legacy column.
    legacy_rows: Mutex<HashMap<i64, Account>>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row that only exists under the legacy column.
    pub async fn insert_legacy_row(&self, account: Account) {
        self.legacy_rows.lock().await.insert(account.telegram_id, account);
    }

    pub async fn has_legacy_row(&self, telegram_id: i64) -> bool {
        self.legacy_rows.lock().await.contains_key(&telegram_id)
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, account: &Account) -> Result<(), Error> {
        self.accounts
            .lock()
            .await
            .insert(account.telegram_id, account.clone());
        Ok(())
    }

    async fn get(&self, telegram_id: i64) -> Result<Option<Account>, Error> {
        if let Some(account) = self.accounts.lock().await.get(&telegram_id) {
            return Ok(Some(account.clone()));
        }
        // Legacy fallback: migrate the row in place on first touch.
        if let Some(account) = self.legacy_rows.lock().await.remove(&telegram_id) {
            self.accounts
                .lock()
                .await
                .insert(telegram_id, account.clone());
            return Ok(Some(account));
        }
        Ok(None)
    }

    async fn update_username(&self, telegram_id: i64, username: &str) -> Result<(), Error> {
        if let Some(account) = self.accounts.lock().await.get_mut(&telegram_id) {
            account.username = Some(username.to_string());
        }
        Ok(())
    }

    async fn bind_referrer(&self, telegram_id: i64, referrer_id: i64) -> Result<bool, Error> {
        let mut accounts = self.accounts.lock().await;
        match accounts.get_mut(&telegram_id) {
            Some(account) if account.referred_by.is_none() => {
                account.referred_by = Some(referrer_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_points(&self, telegram_id: i64, amount: i64) -> Result<(), Error> {
        // Read-current-then-write-sum, the documented non-atomic fallback.
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(&telegram_id) {
            account.points += amount;
        }
        Ok(())
    }

    async fn set_completed_tasks(&self, telegram_id: i64, keys: &[String]) -> Result<(), Error> {
        if let Some(account) = self.accounts.lock().await.get_mut(&telegram_id) {
            account.completed_tasks = keys.to_vec();
        }
        Ok(())
    }

    async fn set_ad_counter(
        &self,
        telegram_id: i64,
        watched_today: i32,
        last_ad_date: NaiveDate,
    ) -> Result<(), Error> {
        if let Some(account) = self.accounts.lock().await.get_mut(&telegram_id) {
            account.ads_watched_today = watched_today;
            account.last_ad_date = Some(last_ad_date);
        }
        Ok(())
    }

    async fn set_status(&self, telegram_id: i64, status: AccountStatus) -> Result<(), Error> {
        if let Some(account) = self.accounts.lock().await.get_mut(&telegram_id) {
            account.status = status;
        }
        Ok(())
    }

    async fn count_referrals(&self, telegram_id: i64) -> Result<i64, Error> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .filter(|a| a.referred_by == Some(telegram_id))
            .count() as i64)
    }

    async fn top_by_points(&self, limit: i64) -> Result<Vec<Account>, Error> {
        let accounts = self.accounts.lock().await;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by(|a, b| b.points.cmp(&a.points).then(a.telegram_id.cmp(&b.telegram_id)));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn list_all(&self) -> Result<Vec<Account>, Error> {
        let accounts = self.accounts.lock().await;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by_key(|a| a.created_at);
        Ok(all)
    }
}

#[derive(Default)]
pub struct MemoryCompletionLogRepository {
    records: Mutex<Vec<CompletionRecord>>,
}

impl MemoryCompletionLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionLogRepository for MemoryCompletionLogRepository {
    async fn append(&self, record: &CompletionRecord) -> Result<(), Error> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn claimed_within(
        &self,
        telegram_id: i64,
        task_id: &str,
        window: Duration,
    ) -> Result<bool, Error> {
        let cutoff = Utc::now() - window;
        let records = self.records.lock().await;
        Ok(records.iter().any(|r| {
            r.telegram_id == telegram_id && r.task_id == task_id && r.completed_at > cutoff
        }))
    }
}

#[derive(Default)]
pub struct MemoryTaskRepository {
    tasks: Mutex<HashMap<String, Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn create(&self, task: &Task) -> Result<(), Error> {
        self.tasks
            .lock()
            .await
            .insert(task.task_id.clone(), task.clone());
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>, Error> {
        Ok(self.tasks.lock().await.get(task_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Task>, Error> {
        let tasks = self.tasks.lock().await;
        let mut all: Vec<Task> = tasks.values().cloned().collect();
        all.sort_by(|a, b| a.task_id.cmp(&b.task_id));
        Ok(all)
    }
}

#[derive(Default)]
pub struct MemoryMilestoneRepository {
    claims: Mutex<HashSet<(i64, String)>>,
}

impl MemoryMilestoneRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MilestoneRepository for MemoryMilestoneRepository {
    async fn insert(&self, claim: &MilestoneClaim) -> Result<(), Error> {
        let mut claims = self.claims.lock().await;
        let key = (claim.telegram_id, claim.milestone_key.clone());
        if !claims.insert(key) {
            return Err(Error::Validation(format!(
                "Duplicate milestone claim '{}' for {}",
                claim.milestone_key, claim.telegram_id
            )));
        }
        Ok(())
    }

    async fn exists(&self, telegram_id: i64, milestone_key: &str) -> Result<bool, Error> {
        let claims = self.claims.lock().await;
        Ok(claims.contains(&(telegram_id, milestone_key.to_string())))
    }
}

/// Ad-watch log fake. `failing()` simulates a deployment where the table
/// was never created, to exercise the warn-and-continue path.
pub struct MemoryAdWatchLogRepository {
    entries: Mutex<Vec<AdWatchEntry>>,
    fail: bool,
}

impl MemoryAdWatchLogRepository {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for MemoryAdWatchLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdWatchLogRepository for MemoryAdWatchLogRepository {
    async fn append(&self, entry: &AdWatchEntry) -> Result<(), Error> {
        if self.fail {
            return Err(Error::Validation(
                "relation \"ad_watch_log\" does not exist".to_string(),
            ));
        }
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}
