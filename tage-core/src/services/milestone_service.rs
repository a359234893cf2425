// tage-core/src/services/milestone_service.rs

use std::sync::Arc;

use tracing::info;

use tage_common::models::milestone::{Milestone, MilestoneClaim};
use tage_common::traits::repository_traits::{AccountRepository, MilestoneRepository};

use crate::services::reward_service::RewardService;
use crate::Error;

#[derive(Debug, Clone)]
pub struct MilestoneReceipt {
    pub milestone_key: String,
    pub reward: i64,
    pub new_points: i64,
}

/// Referral milestones, claimable once each.
pub struct MilestoneService {
    accounts: Arc<dyn AccountRepository>,
    milestones: Arc<dyn MilestoneRepository>,
    rewards: Arc<RewardService>,
}

impl MilestoneService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        milestones: Arc<dyn MilestoneRepository>,
        rewards: Arc<RewardService>,
    ) -> Self {
        Self {
            accounts,
            milestones,
            rewards,
        }
    }

    /// Claim a milestone. The claim row is inserted before the award; if
    /// the award then fails, the claim stays consumed. There is no retry
    /// or compensation.
    pub async fn claim(
        &self,
        telegram_id: i64,
        milestone_key: &str,
    ) -> Result<MilestoneReceipt, Error> {
        let milestone = Milestone::by_key(milestone_key).ok_or_else(|| {
            Error::Validation(format!("Unknown milestone '{}'", milestone_key))
        })?;

        let account = self
            .accounts
            .get(telegram_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No account with telegram_id={}", telegram_id)))?;

        let referrals = self.accounts.count_referrals(telegram_id).await?;
        if referrals < milestone.required_referrals {
            return Err(Error::MilestoneUnmet(format!(
                "Milestone '{}' needs {} referrals, user has {}",
                milestone.key, milestone.required_referrals, referrals
            )));
        }

        if self.milestones.exists(telegram_id, milestone.key).await? {
            return Err(Error::MilestoneClaimed(format!(
                "Milestone '{}' already claimed",
                milestone.key
            )));
        }

        self.milestones
            .insert(&MilestoneClaim::new(telegram_id, milestone.key))
            .await?;

        self.rewards.award(telegram_id, milestone.reward_points).await?;
        info!(telegram_id, milestone = milestone.key, "milestone claimed");

        let new_points = self
            .accounts
            .get(telegram_id)
            .await?
            .map(|a| a.points)
            .unwrap_or(account.points + milestone.reward_points);

        Ok(MilestoneReceipt {
            milestone_key: milestone.key.to_string(),
            reward: milestone.reward_points,
            new_points,
        })
    }
}
