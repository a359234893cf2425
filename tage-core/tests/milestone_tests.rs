// tests/milestone_tests.rs

use std::sync::Arc;

use tage_common::traits::repository_traits::AccountRepository;
use tage_common::Error;
use tage_core::services::{AccountService, LedgerConfig, MilestoneService, RewardService};
use tage_core::test_utils::memory::{MemoryAccountRepository, MemoryMilestoneRepository};

fn setup() -> (Arc<MemoryAccountRepository>, AccountService, MilestoneService) {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let milestones = Arc::new(MemoryMilestoneRepository::new());
    let rewards = Arc::new(RewardService::new(accounts.clone()));
    let account_service = AccountService::new(accounts.clone(), LedgerConfig::default());
    let milestone_service = MilestoneService::new(accounts.clone(), milestones, rewards);
    (accounts, account_service, milestone_service)
}

async fn add_referrals(account_service: &AccountService, referrer: i64, n: i64) -> Result<(), Error> {
    for i in 0..n {
        account_service
            .upsert(10_000 + i, "referred", Some(referrer))
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn milestone_requires_threshold() -> Result<(), Error> {
    let (_, account_service, milestone_service) = setup();
    account_service.upsert(1, "alice", None).await?;
    add_referrals(&account_service, 1, 4).await?;

    let err = milestone_service.claim(1, "refs_5").await.unwrap_err();
    assert!(matches!(err, Error::MilestoneUnmet(_)));
    Ok(())
}

#[tokio::test]
async fn milestone_claim_awards_once() -> Result<(), Error> {
    let (accounts, account_service, milestone_service) = setup();
    account_service.upsert(1, "alice", None).await?;
    add_referrals(&account_service, 1, 5).await?;

    let receipt = milestone_service.claim(1, "refs_5").await?;
    assert_eq!(receipt.reward, 1_000);
    assert_eq!(receipt.new_points, 1_000);

    let err = milestone_service.claim(1, "refs_5").await.unwrap_err();
    assert!(matches!(err, Error::MilestoneClaimed(_)));

    let account = accounts.get(1).await?.expect("account exists");
    assert_eq!(account.points, 1_000, "duplicate claim must not re-award");
    Ok(())
}

#[tokio::test]
async fn unknown_milestone_key_is_a_validation_error() -> Result<(), Error> {
    let (_, account_service, milestone_service) = setup();
    account_service.upsert(1, "alice", None).await?;

    let err = milestone_service.claim(1, "refs_9000").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn milestone_award_pays_referrer_commission() -> Result<(), Error> {
    let (accounts, account_service, milestone_service) = setup();
    account_service.upsert(2, "referrer", None).await?;
    account_service.upsert(1, "alice", Some(2)).await?;
    add_referrals(&account_service, 1, 5).await?;

    milestone_service.claim(1, "refs_5").await?;

    let referrer = accounts.get(2).await?.expect("referrer exists");
    assert_eq!(referrer.points, 200, "floor(1000 * 0.20)");
    Ok(())
}
