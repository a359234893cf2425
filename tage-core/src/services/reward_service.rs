// tage-core/src/services/reward_service.rs

use std::sync::Arc;

use tage_common::traits::repository_traits::AccountRepository;

use crate::Error;

/// Referral commission rate, percent. All revisions agree on 20%.
const COMMISSION_PERCENT: i64 = 20;

/// Applies point rewards and the single level of referral commission.
///
/// Commission is deliberately a straight two-step sequence, not a
/// recursive walk: the referrer's own referrer never earns anything.
pub struct RewardService {
    accounts: Arc<dyn AccountRepository>,
}

impl RewardService {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Credit `amount` to the beneficiary, then `floor(amount * 20%)` to
    /// their referrer if one is bound. A zero commission is skipped.
    ///
    /// There is no transaction spanning the two increments; a failure
    /// between them leaves the referrer uncredited relative to the
    /// beneficiary, which the caller surfaces as-is.
    pub async fn award(&self, telegram_id: i64, amount: i64) -> Result<(), Error> {
        if amount < 0 {
            return Err(Error::Validation(format!(
                "Reward amount must be non-negative, got {}",
                amount
            )));
        }
        if amount == 0 {
            return Ok(());
        }

        self.accounts.add_points(telegram_id, amount).await?;

        let account = self.accounts.get(telegram_id).await?;
        if let Some(referrer_id) = account.and_then(|a| a.referred_by) {
            let commission = amount * COMMISSION_PERCENT / 100;
            if commission > 0 {
                self.accounts.add_points(referrer_id, commission).await?;
            }
        }

        Ok(())
    }
}
