// tests/leaderboard_tests.rs

use std::sync::Arc;

use tage_common::models::account::Account;
use tage_common::Error;
use tage_core::services::LeaderboardService;
use tage_core::test_utils::memory::MemoryAccountRepository;

use tage_common::traits::repository_traits::AccountRepository;

fn setup() -> (Arc<MemoryAccountRepository>, LeaderboardService) {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let service = LeaderboardService::new(accounts.clone());
    (accounts, service)
}

#[tokio::test]
async fn points_leaderboard_is_capped_and_descending() -> Result<(), Error> {
    let (accounts, service) = setup();

    for i in 0..60 {
        let mut account = Account::new(i, Some(&format!("user{}", i)), None);
        account.points = i * 10;
        accounts.create(&account).await?;
    }

    let top = service.top_by_points().await?;
    assert_eq!(top.len(), 50);
    assert!(top.windows(2).all(|w| w[0].points >= w[1].points));
    assert_eq!(top[0].points, 590);
    Ok(())
}

#[tokio::test]
async fn referral_leaderboard_counts_and_sorts() -> Result<(), Error> {
    let (accounts, service) = setup();

    accounts.create(&Account::new(1, Some("popular"), None)).await?;
    accounts.create(&Account::new(2, Some("modest"), None)).await?;
    for i in 0..3 {
        accounts.create(&Account::new(100 + i, Some("fan"), Some(1))).await?;
    }
    accounts.create(&Account::new(200, Some("friend"), Some(2))).await?;

    let ranking = service.top_by_referrals().await?;
    assert_eq!(ranking[0].username.as_deref(), Some("popular"));
    assert_eq!(ranking[0].ref_count, 3);
    assert_eq!(ranking[1].username.as_deref(), Some("modest"));
    assert_eq!(ranking[1].ref_count, 1);
    Ok(())
}

#[tokio::test]
async fn referral_leaderboard_zero_fills_without_referrals() -> Result<(), Error> {
    let (accounts, service) = setup();

    // Nobody referred anyone: every account still shows up, all zeros.
    for i in 0..5 {
        accounts.create(&Account::new(i, Some(&format!("user{}", i)), None)).await?;
    }

    let ranking = service.top_by_referrals().await?;
    assert_eq!(ranking.len(), 5);
    assert!(ranking.iter().all(|e| e.ref_count == 0));
    Ok(())
}

#[tokio::test]
async fn referral_leaderboard_is_capped_at_fifty() -> Result<(), Error> {
    let (accounts, service) = setup();

    for i in 0..70 {
        accounts.create(&Account::new(i, Some("user"), None)).await?;
    }

    let ranking = service.top_by_referrals().await?;
    assert_eq!(ranking.len(), 50);
    Ok(())
}
