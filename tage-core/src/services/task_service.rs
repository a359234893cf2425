// tage-core/src/services/task_service.rs

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::debug;

use tage_common::models::completion::CompletionRecord;
use tage_common::traits::repository_traits::{
    AccountRepository, CompletionLogRepository, TaskRepository,
};

use crate::services::reward_service::RewardService;
use crate::services::LedgerConfig;
use crate::Error;

/// How long a completion-log row blocks a re-claim of the same task.
const CLAIM_WINDOW_HOURS: i64 = 24;

/// Dated claims bind `"<task_id>:<date>"` and may be re-claimed the next
/// calendar day; one-shot claims (onboarding) are blocked forever by
/// their completion-log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimMode {
    Daily,
    Once,
}

#[derive(Debug, Clone)]
pub enum TaskClaimOutcome {
    Claimed {
        reward: i64,
        new_points: i64,
        claimed_keys: Vec<String>,
    },
    /// User-facing state, not a system error: the claim already happened
    /// today (or ever, for one-shot tasks).
    AlreadyClaimed,
}

pub struct TaskService {
    accounts: Arc<dyn AccountRepository>,
    completions: Arc<dyn CompletionLogRepository>,
    tasks: Arc<dyn TaskRepository>,
    rewards: Arc<RewardService>,
    config: LedgerConfig,
}

impl TaskService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        completions: Arc<dyn CompletionLogRepository>,
        tasks: Arc<dyn TaskRepository>,
        rewards: Arc<RewardService>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            accounts,
            completions,
            tasks,
            rewards,
            config,
        }
    }

    /// Dated daily claim at the configured flat default reward. This is
    /// what `/complete-task` awards regardless of the task's own points.
    pub async fn claim_default(
        &self,
        telegram_id: i64,
        task_id: &str,
    ) -> Result<TaskClaimOutcome, Error> {
        self.claim(
            telegram_id,
            task_id,
            Some(self.config.task_default_reward),
            ClaimMode::Daily,
        )
        .await
    }

    /// Claim a task reward. The multi-step sequence is not transactional:
    /// a failure after the completion record is appended leaves the
    /// account under-credited relative to the log (at-least-once record,
    /// at-most-once reward).
    pub async fn claim(
        &self,
        telegram_id: i64,
        task_id: &str,
        explicit_reward: Option<i64>,
        mode: ClaimMode,
    ) -> Result<TaskClaimOutcome, Error> {
        let account = self
            .accounts
            .get(telegram_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No account with telegram_id={}", telegram_id)))?;

        let today = Utc::now().date_naive();
        let dated_key = format!("{}:{}", task_id, today.format("%Y-%m-%d"));

        // Dedup against both sources of truth: the account's claim-key
        // cache and the rolling completion-log window. Either one blocks.
        let cached = match mode {
            ClaimMode::Daily => account.completed_tasks.iter().any(|k| *k == dated_key),
            ClaimMode::Once => account.completed_tasks.iter().any(|k| k == task_id),
        };
        let window = match mode {
            ClaimMode::Daily => Duration::hours(CLAIM_WINDOW_HOURS),
            ClaimMode::Once => Duration::days(365 * 100),
        };
        if cached || self.completions.claimed_within(telegram_id, task_id, window).await? {
            debug!(telegram_id, task_id, "task already claimed");
            return Ok(TaskClaimOutcome::AlreadyClaimed);
        }

        self.completions
            .append(&CompletionRecord::new(telegram_id, task_id))
            .await?;

        let reward = match explicit_reward {
            Some(amount) if amount > 0 => amount,
            _ => match self.tasks.get(task_id).await? {
                Some(task) if task.points > 0 => task.points,
                _ => {
                    return Err(Error::InvalidReward(format!(
                        "No positive reward configured for task '{}'",
                        task_id
                    )))
                }
            },
        };

        let claimed_keys = match mode {
            ClaimMode::Daily => {
                // Prune anything that is not a well-formed dated key;
                // malformed legacy entries are dropped rather than kept.
                let mut keys: Vec<String> = account
                    .completed_tasks
                    .iter()
                    .filter(|k| is_dated_key(k))
                    .cloned()
                    .collect();
                keys.push(dated_key);
                self.accounts.set_completed_tasks(telegram_id, &keys).await?;
                keys
            }
            ClaimMode::Once => {
                let mut keys = account.completed_tasks.clone();
                keys.push(task_id.to_string());
                self.accounts.set_completed_tasks(telegram_id, &keys).await?;
                keys
            }
        };

        self.rewards.award(telegram_id, reward).await?;

        let new_points = self
            .accounts
            .get(telegram_id)
            .await?
            .map(|a| a.points)
            .unwrap_or(account.points + reward);

        Ok(TaskClaimOutcome::Claimed {
            reward,
            new_points,
            claimed_keys,
        })
    }

    pub async fn list_tasks(&self) -> Result<Vec<tage_common::models::task::Task>, Error> {
        self.tasks.list_all().await
    }

    /// Tasks the user has not claimed today (dated keys) or ever (bare
    /// legacy keys).
    pub async fn available_tasks(
        &self,
        telegram_id: i64,
    ) -> Result<Vec<tage_common::models::task::Task>, Error> {
        let account = self
            .accounts
            .get(telegram_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No account with telegram_id={}", telegram_id)))?;

        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let all = self.tasks.list_all().await?;
        Ok(all
            .into_iter()
            .filter(|t| {
                let dated = format!("{}:{}", t.task_id, today);
                !account
                    .completed_tasks
                    .iter()
                    .any(|k| *k == dated || *k == t.task_id)
            })
            .collect())
    }
}

/// A well-formed claim key is `<task_id>:<YYYY-MM-DD>` where the date
/// actually parses.
fn is_dated_key(key: &str) -> bool {
    match key.rsplit_once(':') {
        Some((task_id, date)) => {
            !task_id.is_empty() && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
        }
        None => false,
    }
}
