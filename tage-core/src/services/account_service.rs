// tage-core/src/services/account_service.rs

use std::sync::Arc;

use tracing::info;

use tage_common::models::account::Account;
use tage_common::traits::repository_traits::AccountRepository;

use crate::services::LedgerConfig;
use crate::Error;

/// Result of a one-shot referral bind.
#[derive(Debug, Clone)]
pub struct BindOutcome {
    pub already_bound: bool,
    pub referred_by: Option<i64>,
}

/// Account registration, lookup and referral binding.
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    config: LedgerConfig,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountRepository>, config: LedgerConfig) -> Self {
        Self { accounts, config }
    }

    pub async fn get(&self, telegram_id: i64) -> Result<Option<Account>, Error> {
        self.accounts.get(telegram_id).await
    }

    pub async fn require(&self, telegram_id: i64) -> Result<Account, Error> {
        self.accounts
            .get(telegram_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No account with telegram_id={}", telegram_id)))
    }

    /// Create-or-update. Referral binding is first-write-wins: an existing
    /// non-null `referred_by` is never touched, and a self-referral is
    /// silently dropped at creation time.
    pub async fn upsert(
        &self,
        telegram_id: i64,
        username: &str,
        referrer_id: Option<i64>,
    ) -> Result<(Account, bool), Error> {
        let referred_by = referrer_id.filter(|r| *r != telegram_id);

        if let Some(existing) = self.accounts.get(telegram_id).await? {
            self.accounts.update_username(telegram_id, username).await?;
            if existing.referred_by.is_none() {
                if let Some(referrer) = referred_by {
                    self.accounts.bind_referrer(telegram_id, referrer).await?;
                }
            }
            let account = self.require(telegram_id).await?;
            return Ok((account, false));
        }

        let account = Account::new(telegram_id, Some(username), referred_by);
        self.accounts.create(&account).await?;
        info!(telegram_id, "created account");
        Ok((account, true))
    }

    /// Legacy `/auth` entry point: an unknown account is created with a
    /// deterministic pseudo-age derived from the id and an onboarding
    /// balance proportional to it.
    pub async fn auth(&self, telegram_id: i64, username: &str) -> Result<Account, Error> {
        if let Some(account) = self.accounts.get(telegram_id).await? {
            return Ok(account);
        }

        let age_days = pseudo_account_age_days(telegram_id);
        let mut account = Account::new(telegram_id, Some(username), None);
        account.account_age_days = age_days;
        account.points = i64::from(age_days) * self.config.onboarding_points_per_day;
        self.accounts.create(&account).await?;
        info!(telegram_id, age_days, "created account via auth");
        Ok(account)
    }

    /// One-shot referral bind, separate from upsert for clients that
    /// resolve the referrer after registration.
    pub async fn bind_referrer(
        &self,
        telegram_id: i64,
        referrer_id: i64,
    ) -> Result<BindOutcome, Error> {
        if telegram_id == referrer_id {
            return Err(Error::Validation(
                "Cannot refer yourself".to_string(),
            ));
        }

        let account = self.require(telegram_id).await?;
        if let Some(existing) = account.referred_by {
            return Ok(BindOutcome {
                already_bound: true,
                referred_by: Some(existing),
            });
        }

        let bound = self.accounts.bind_referrer(telegram_id, referrer_id).await?;
        if bound {
            Ok(BindOutcome {
                already_bound: false,
                referred_by: Some(referrer_id),
            })
        } else {
            // Lost a race with another bind; report what is stored now.
            let account = self.require(telegram_id).await?;
            Ok(BindOutcome {
                already_bound: true,
                referred_by: account.referred_by,
            })
        }
    }

    pub async fn referral_count(&self, telegram_id: i64) -> Result<i64, Error> {
        self.accounts.count_referrals(telegram_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Account>, Error> {
        self.accounts.list_all().await
    }

    pub async fn set_status(
        &self,
        telegram_id: i64,
        status: tage_common::models::account::AccountStatus,
    ) -> Result<(), Error> {
        self.require(telegram_id).await?;
        self.accounts.set_status(telegram_id, status).await
    }
}

/// Deterministic stand-in for the account-age lookup the original client
/// performed: a value in [100, 2100) derived from the id.
fn pseudo_account_age_days(telegram_id: i64) -> i32 {
    (100 + telegram_id.rem_euclid(2_000)) as i32
}
