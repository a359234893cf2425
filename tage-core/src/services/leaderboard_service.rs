// tage-core/src/services/leaderboard_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use tage_common::traits::repository_traits::AccountRepository;

use crate::Error;

const LEADERBOARD_LIMIT: i64 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct PointsEntry {
    pub username: Option<String>,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralEntry {
    pub username: Option<String>,
    pub ref_count: i64,
}

/// Leaderboards by total points and by referral count.
pub struct LeaderboardService {
    accounts: Arc<dyn AccountRepository>,
}

impl LeaderboardService {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Top 50 by points, descending. Ties keep the store's stable order.
    pub async fn top_by_points(&self) -> Result<Vec<PointsEntry>, Error> {
        let accounts = self.accounts.top_by_points(LEADERBOARD_LIMIT).await?;
        Ok(accounts
            .into_iter()
            .map(|a| PointsEntry {
                username: a.username,
                points: a.points,
            })
            .collect())
    }

    /// Top 50 by referral count. Counting happens in memory over the full
    /// account list; an account nobody refers to still appears with a
    /// zero count, so an inconsistent referral scheme degrades to a
    /// zero-filled listing instead of an error.
    pub async fn top_by_referrals(&self) -> Result<Vec<ReferralEntry>, Error> {
        let accounts = self.accounts.list_all().await?;

        let mut counts: HashMap<i64, i64> = HashMap::new();
        for account in &accounts {
            if let Some(referrer) = account.referred_by {
                *counts.entry(referrer).or_insert(0) += 1;
            }
        }

        let mut ranking: Vec<ReferralEntry> = accounts
            .into_iter()
            .map(|a| ReferralEntry {
                ref_count: counts.get(&a.telegram_id).copied().unwrap_or(0),
                username: a.username,
            })
            .collect();

        ranking.sort_by(|a, b| b.ref_count.cmp(&a.ref_count));
        ranking.truncate(LEADERBOARD_LIMIT as usize);
        Ok(ranking)
    }
}
