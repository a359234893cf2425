// tests/ledger_tests.rs
//
// Ledger rules exercised end to end over the in-memory repositories:
// registration, referral binding, task claims and commission.

use std::sync::Arc;

use tage_common::models::task::Task;
use tage_common::traits::repository_traits::{AccountRepository, TaskRepository};
use tage_common::Error;
use tage_core::services::{
    AccountService, ClaimMode, LedgerConfig, RewardService, TaskClaimOutcome, TaskService,
};
use tage_core::test_utils::memory::{
    MemoryAccountRepository, MemoryCompletionLogRepository, MemoryTaskRepository,
};

struct Ledger {
    accounts: Arc<MemoryAccountRepository>,
    tasks: Arc<MemoryTaskRepository>,
    account_service: AccountService,
    task_service: TaskService,
}

fn setup_ledger() -> Ledger {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let completions = Arc::new(MemoryCompletionLogRepository::new());
    let tasks = Arc::new(MemoryTaskRepository::new());
    let rewards = Arc::new(RewardService::new(accounts.clone()));

    let account_service = AccountService::new(accounts.clone(), LedgerConfig::default());
    let task_service = TaskService::new(
        accounts.clone(),
        completions,
        tasks.clone(),
        rewards,
        LedgerConfig::default(),
    );

    Ledger {
        accounts,
        tasks,
        account_service,
        task_service,
    }
}

#[tokio::test]
async fn upsert_creates_then_updates() -> Result<(), Error> {
    let ledger = setup_ledger();

    let (account, is_new) = ledger.account_service.upsert(1, "alice", None).await?;
    assert!(is_new);
    assert_eq!(account.points, 0);
    assert_eq!(account.referred_by, None);

    let (account, is_new) = ledger.account_service.upsert(1, "alice_renamed", None).await?;
    assert!(!is_new);
    assert_eq!(account.username.as_deref(), Some("alice_renamed"));
    Ok(())
}

#[tokio::test]
async fn self_referral_is_dropped_at_creation() -> Result<(), Error> {
    let ledger = setup_ledger();
    let (account, _) = ledger.account_service.upsert(7, "bob", Some(7)).await?;
    assert_eq!(account.referred_by, None);
    Ok(())
}

#[tokio::test]
async fn referral_binding_is_first_write_wins() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(10, "referrer", None).await?;
    ledger.account_service.upsert(11, "other", None).await?;

    let (account, _) = ledger.account_service.upsert(1, "alice", Some(10)).await?;
    assert_eq!(account.referred_by, Some(10));

    // A different referrer on a later upsert must not rebind.
    let (account, _) = ledger.account_service.upsert(1, "alice", Some(11)).await?;
    assert_eq!(account.referred_by, Some(10));
    Ok(())
}

#[tokio::test]
async fn bind_referrer_rejects_self_and_reports_already_bound() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(1, "alice", None).await?;

    let err = ledger.account_service.bind_referrer(1, 1).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let outcome = ledger.account_service.bind_referrer(1, 99).await?;
    assert!(!outcome.already_bound);
    assert_eq!(outcome.referred_by, Some(99));

    let outcome = ledger.account_service.bind_referrer(1, 100).await?;
    assert!(outcome.already_bound);
    assert_eq!(outcome.referred_by, Some(99));
    Ok(())
}

#[tokio::test]
async fn task_claim_awards_and_propagates_commission() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(2, "referrer_b", None).await?;
    ledger.account_service.upsert(1, "alice", Some(2)).await?;

    let outcome = ledger
        .task_service
        .claim(1, "follow_x", Some(1_000), ClaimMode::Daily)
        .await?;
    let TaskClaimOutcome::Claimed { reward, new_points, .. } = outcome else {
        panic!("expected a fresh claim");
    };
    assert_eq!(reward, 1_000);
    assert_eq!(new_points, 1_000);

    // 20% commission, one level only.
    let referrer = ledger.accounts.get(2).await?.expect("referrer exists");
    assert_eq!(referrer.points, 200);
    Ok(())
}

#[tokio::test]
async fn default_claim_pays_the_configured_flat_reward() -> Result<(), Error> {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let completions = Arc::new(MemoryCompletionLogRepository::new());
    let tasks = Arc::new(MemoryTaskRepository::new());
    let rewards = Arc::new(RewardService::new(accounts.clone()));

    let account_service = AccountService::new(accounts.clone(), LedgerConfig::default());
    let task_service = TaskService::new(
        accounts.clone(),
        completions,
        tasks,
        rewards,
        LedgerConfig {
            task_default_reward: 777,
            ..LedgerConfig::default()
        },
    );

    account_service.upsert(1, "alice", None).await?;

    // The flat reward comes from the service's own config, ignoring any
    // per-task points.
    let outcome = task_service.claim_default(1, "follow_x").await?;
    let TaskClaimOutcome::Claimed { reward, new_points, .. } = outcome else {
        panic!("expected a fresh claim");
    };
    assert_eq!(reward, 777);
    assert_eq!(new_points, 777);

    let second = task_service.claim_default(1, "follow_x").await?;
    assert!(matches!(second, TaskClaimOutcome::AlreadyClaimed));
    Ok(())
}

#[tokio::test]
async fn same_day_reclaim_is_already_claimed_not_an_error() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(1, "alice", None).await?;

    let first = ledger
        .task_service
        .claim(1, "follow_x", Some(500), ClaimMode::Daily)
        .await?;
    assert!(matches!(first, TaskClaimOutcome::Claimed { .. }));

    let second = ledger
        .task_service
        .claim(1, "follow_x", Some(500), ClaimMode::Daily)
        .await?;
    assert!(matches!(second, TaskClaimOutcome::AlreadyClaimed));

    let account = ledger.accounts.get(1).await?.expect("account exists");
    assert_eq!(account.points, 500, "second claim must not change points");
    Ok(())
}

#[tokio::test]
async fn reward_falls_back_to_task_points_and_rejects_nonpositive() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(1, "alice", None).await?;
    ledger
        .tasks
        .create(&Task {
            task_id: "join_channel".to_string(),
            title: "Join the channel".to_string(),
            link: None,
            points: 750,
            category: None,
        })
        .await?;

    let outcome = ledger
        .task_service
        .claim(1, "join_channel", None, ClaimMode::Daily)
        .await?;
    let TaskClaimOutcome::Claimed { reward, .. } = outcome else {
        panic!("expected a fresh claim");
    };
    assert_eq!(reward, 750);

    // No explicit amount and no configured task: invalid reward.
    let err = ledger
        .task_service
        .claim(1, "unknown_task", None, ClaimMode::Daily)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidReward(_)));
    Ok(())
}

#[tokio::test]
async fn claim_prunes_malformed_legacy_keys() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(1, "alice", None).await?;
    ledger
        .accounts
        .set_completed_tasks(
            1,
            &[
                "legacy_bare_task".to_string(),
                "old:not-a-date".to_string(),
                "kept:2020-01-01".to_string(),
            ],
        )
        .await?;

    let outcome = ledger
        .task_service
        .claim(1, "follow_x", Some(100), ClaimMode::Daily)
        .await?;
    let TaskClaimOutcome::Claimed { claimed_keys, .. } = outcome else {
        panic!("expected a fresh claim");
    };

    assert!(claimed_keys.contains(&"kept:2020-01-01".to_string()));
    assert!(claimed_keys.iter().any(|k| k.starts_with("follow_x:")));
    assert!(!claimed_keys.contains(&"legacy_bare_task".to_string()));
    assert!(!claimed_keys.contains(&"old:not-a-date".to_string()));
    Ok(())
}

#[tokio::test]
async fn once_mode_blocks_reclaim_forever() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(1, "alice", None).await?;

    let first = ledger
        .task_service
        .claim(1, "onboarding", Some(300), ClaimMode::Once)
        .await?;
    assert!(matches!(first, TaskClaimOutcome::Claimed { .. }));

    let second = ledger
        .task_service
        .claim(1, "onboarding", Some(300), ClaimMode::Once)
        .await?;
    assert!(matches!(second, TaskClaimOutcome::AlreadyClaimed));
    Ok(())
}

#[tokio::test]
async fn zero_commission_is_skipped() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(2, "referrer", None).await?;
    ledger.account_service.upsert(1, "alice", Some(2)).await?;

    // floor(4 * 0.20) == 0: referrer must stay untouched.
    ledger
        .task_service
        .claim(1, "tiny", Some(4), ClaimMode::Daily)
        .await?;

    let referrer = ledger.accounts.get(2).await?.expect("referrer exists");
    assert_eq!(referrer.points, 0);
    Ok(())
}

#[tokio::test]
async fn commission_is_single_level() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(3, "grand_referrer", None).await?;
    ledger.account_service.upsert(2, "referrer", Some(3)).await?;
    ledger.account_service.upsert(1, "alice", Some(2)).await?;

    ledger
        .task_service
        .claim(1, "follow_x", Some(1_000), ClaimMode::Daily)
        .await?;

    let referrer = ledger.accounts.get(2).await?.expect("referrer exists");
    let grand = ledger.accounts.get(3).await?.expect("grand referrer exists");
    assert_eq!(referrer.points, 200);
    assert_eq!(grand.points, 0, "commission must not chain past one level");
    Ok(())
}

#[tokio::test]
async fn points_never_go_negative() -> Result<(), Error> {
    let ledger = setup_ledger();
    ledger.account_service.upsert(1, "alice", None).await?;

    for (task, reward) in [("a", 1), ("b", 50), ("c", 1_000)] {
        ledger
            .task_service
            .claim(1, task, Some(reward), ClaimMode::Daily)
            .await?;
        let account = ledger.accounts.get(1).await?.expect("account exists");
        assert!(account.points >= 0);
    }
    Ok(())
}

#[tokio::test]
async fn auth_gives_deterministic_onboarding_balance() -> Result<(), Error> {
    let ledger = setup_ledger();

    let first = ledger.account_service.auth(42, "alice").await?;
    assert!(first.account_age_days >= 100);
    assert_eq!(
        first.points,
        i64::from(first.account_age_days) * LedgerConfig::default().onboarding_points_per_day
    );

    // Second auth returns the stored account untouched.
    let second = ledger.account_service.auth(42, "alice").await?;
    assert_eq!(second.points, first.points);
    Ok(())
}
