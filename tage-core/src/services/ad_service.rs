// tage-core/src/services/ad_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use tage_common::models::completion::AdWatchEntry;
use tage_common::traits::repository_traits::{AccountRepository, AdWatchLogRepository};

use crate::services::reward_service::RewardService;
use crate::services::LedgerConfig;
use crate::Error;

#[derive(Debug, Clone)]
pub struct AdWatchReceipt {
    pub new_points: i64,
    pub watched_today: i32,
}

/// Daily-capped ad rewards. The counter lives on the account row itself
/// and is only meaningful relative to `last_ad_date`; a date mismatch
/// means the counter is stale and reads as zero.
pub struct AdService {
    accounts: Arc<dyn AccountRepository>,
    ad_log: Arc<dyn AdWatchLogRepository>,
    rewards: Arc<RewardService>,
    config: LedgerConfig,
}

impl AdService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        ad_log: Arc<dyn AdWatchLogRepository>,
        rewards: Arc<RewardService>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            accounts,
            ad_log,
            rewards,
            config,
        }
    }

    pub async fn watch(&self, telegram_id: i64) -> Result<AdWatchReceipt, Error> {
        let account = self
            .accounts
            .get(telegram_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No account with telegram_id={}", telegram_id)))?;

        let today = Utc::now().date_naive();
        let count = if account.last_ad_date == Some(today) {
            account.ads_watched_today
        } else {
            0
        };

        if count >= self.config.ad_daily_cap {
            return Err(Error::DailyLimit(format!(
                "Ad limit of {} per day reached",
                self.config.ad_daily_cap
            )));
        }

        let watched_today = count + 1;
        self.accounts
            .set_ad_counter(telegram_id, watched_today, today)
            .await?;

        self.rewards.award(telegram_id, self.config.ad_reward_points).await?;

        // Best effort only. Some deployments never created this table,
        // and a missing log row must not cost the user their reward.
        if let Err(e) = self.ad_log.append(&AdWatchEntry::new(telegram_id)).await {
            warn!(telegram_id, "ad watch log append failed: {}", e);
        }

        let new_points = self
            .accounts
            .get(telegram_id)
            .await?
            .map(|a| a.points)
            .unwrap_or(account.points + self.config.ad_reward_points);

        Ok(AdWatchReceipt {
            new_points,
            watched_today,
        })
    }
}
