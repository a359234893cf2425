use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A referral milestone a user can claim once.
#[derive(Debug, Clone, Copy)]
pub struct Milestone {
    pub key: &'static str,
    pub required_referrals: i64,
    pub reward_points: i64,
}

/// Fixed milestone catalog. Keys are stored verbatim in
/// `milestone_claims`, so renaming one would orphan old claims.
pub const MILESTONES: &[Milestone] = &[
    Milestone { key: "refs_5", required_referrals: 5, reward_points: 1_000 },
    Milestone { key: "refs_25", required_referrals: 25, reward_points: 10_000 },
    Milestone { key: "refs_100", required_referrals: 100, reward_points: 50_000 },
];

impl Milestone {
    pub fn by_key(key: &str) -> Option<&'static Milestone> {
        MILESTONES.iter().find(|m| m.key == key)
    }
}

/// Immutable claim row; at most one per (account, key).
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct MilestoneClaim {
    pub telegram_id: i64,
    pub milestone_key: String,
    pub claimed_at: DateTime<Utc>,
}

impl MilestoneClaim {
    pub fn new(telegram_id: i64, milestone_key: &str) -> Self {
        Self {
            telegram_id,
            milestone_key: milestone_key.to_string(),
            claimed_at: Utc::now(),
        }
    }
}
