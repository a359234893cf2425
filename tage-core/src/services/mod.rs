// tage-core/src/services/mod.rs

pub mod account_service;
pub mod ad_service;
pub mod leaderboard_service;
pub mod milestone_service;
pub mod reward_service;
pub mod task_service;

pub use account_service::{AccountService, BindOutcome};
pub use ad_service::{AdService, AdWatchReceipt};
pub use leaderboard_service::{LeaderboardService, PointsEntry, ReferralEntry};
pub use milestone_service::{MilestoneReceipt, MilestoneService};
pub use reward_service::RewardService;
pub use task_service::{ClaimMode, TaskClaimOutcome, TaskService};

/// Reward constants that have drifted across revisions of this backend
/// (500 vs 1000 per ad, differing onboarding formulas). They are
/// configuration, not rule logic; see the env overrides in tage-server.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub ad_reward_points: i64,
    pub ad_daily_cap: i32,
    pub task_default_reward: i64,
    pub onboarding_points_per_day: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ad_reward_points: 500,
            ad_daily_cap: 10,
            task_default_reward: 1_000,
            onboarding_points_per_day: 10,
        }
    }
}
