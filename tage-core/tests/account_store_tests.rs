// tests/account_store_tests.rs
//
// Account-store behaviors that live behind the repository trait: the
// legacy-column fallback shim and the completion-log claim window.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tage_common::models::account::Account;
use tage_common::models::completion::CompletionRecord;
use tage_common::traits::repository_traits::{AccountRepository, CompletionLogRepository};
use tage_common::Error;
use tage_core::services::{ClaimMode, LedgerConfig, RewardService, TaskClaimOutcome, TaskService};
use tage_core::test_utils::memory::{
    MemoryAccountRepository, MemoryCompletionLogRepository, MemoryTaskRepository,
};

#[tokio::test]
async fn legacy_row_is_found_and_migrated_in_place() -> Result<(), Error> {
    let accounts = MemoryAccountRepository::new();

    let mut old = Account::new(77, Some("old_timer"), None);
    old.points = 4_200;
    accounts.insert_legacy_row(old).await;

    // First lookup falls back to the legacy keyspace and migrates.
    let found = accounts.get(77).await?.expect("legacy row resolves");
    assert_eq!(found.points, 4_200);
    assert!(!accounts.has_legacy_row(77).await, "row migrated forward");

    // Second lookup takes the primary path.
    let again = accounts.get(77).await?.expect("migrated row resolves");
    assert_eq!(again.points, 4_200);
    Ok(())
}

#[tokio::test]
async fn completion_window_expires_after_24_hours() -> Result<(), Error> {
    let log = MemoryCompletionLogRepository::new();

    let mut record = CompletionRecord::new(1, "follow_x");
    record.completed_at = Utc::now() - Duration::hours(25);
    log.append(&record).await?;

    assert!(!log.claimed_within(1, "follow_x", Duration::hours(24)).await?);
    assert!(log.claimed_within(1, "follow_x", Duration::hours(26)).await?);
    Ok(())
}

#[tokio::test]
async fn stale_log_row_does_not_block_a_new_day_claim() -> Result<(), Error> {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let completions = Arc::new(MemoryCompletionLogRepository::new());
    let tasks = Arc::new(MemoryTaskRepository::new());
    let rewards = Arc::new(RewardService::new(accounts.clone()));
    let service = TaskService::new(
        accounts.clone(),
        completions.clone(),
        tasks,
        rewards,
        LedgerConfig::default(),
    );

    accounts.create(&Account::new(1, Some("alice"), None)).await?;

    // A claim logged 25h ago is outside the window; the dated cache key
    // from that day no longer matches today either.
    let mut record = CompletionRecord::new(1, "follow_x");
    record.completed_at = Utc::now() - Duration::hours(25);
    completions.append(&record).await?;
    let old_day = (Utc::now() - Duration::days(1)).date_naive();
    accounts
        .set_completed_tasks(1, &[format!("follow_x:{}", old_day.format("%Y-%m-%d"))])
        .await?;

    let outcome = service.claim(1, "follow_x", Some(100), ClaimMode::Daily).await?;
    assert!(matches!(outcome, TaskClaimOutcome::Claimed { .. }));
    Ok(())
}

#[tokio::test]
async fn recent_log_row_blocks_even_with_an_empty_cache() -> Result<(), Error> {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let completions = Arc::new(MemoryCompletionLogRepository::new());
    let tasks = Arc::new(MemoryTaskRepository::new());
    let rewards = Arc::new(RewardService::new(accounts.clone()));
    let service = TaskService::new(
        accounts.clone(),
        completions.clone(),
        tasks,
        rewards,
        LedgerConfig::default(),
    );

    accounts.create(&Account::new(1, Some("alice"), None)).await?;

    // The two dedup sources are redundant: a log row alone must block.
    completions.append(&CompletionRecord::new(1, "follow_x")).await?;

    let outcome = service.claim(1, "follow_x", Some(100), ClaimMode::Daily).await?;
    assert!(matches!(outcome, TaskClaimOutcome::AlreadyClaimed));
    Ok(())
}
