// tage-server/src/context.rs

use std::sync::Arc;

use tage_common::traits::repository_traits::{CompletionLogRepository, TaskRepository};
use tage_core::db::Database;
use tage_core::notifier::Notifier;
use tage_core::services::{
    AccountService, AdService, LeaderboardService, LedgerConfig, MilestoneService, TaskService,
};

/// Runtime settings the handlers need beyond the services themselves.
#[derive(Clone)]
pub struct AppConfig {
    pub bot_token: Option<String>,
    pub admin_secret: Option<String>,
    pub admin_telegram_id: i64,
    pub webhook_base_url: Option<String>,
    pub ledger: LedgerConfig,
}

/// Everything the HTTP layer shares across requests. Handlers receive it
/// as `State<Arc<AppContext>>`.
pub struct AppContext {
    pub accounts: AccountService,
    pub tasks: TaskService,
    pub ads: AdService,
    pub milestones: MilestoneService,
    pub leaderboard: LeaderboardService,
    pub completions: Arc<dyn CompletionLogRepository>,
    /// Direct task-store handle for the admin surface; user-facing task
    /// reads go through `tasks`.
    pub task_repo: Arc<dyn TaskRepository>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub db: Database,
    pub config: AppConfig,
}
