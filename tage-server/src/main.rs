// tage-server/src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tage_common::Error;
use tage_core::db::Database;
use tage_core::http::DefaultHttpClient;
use tage_core::notifier::{Notifier, TelegramNotifier};
use tage_core::repositories::{
    PostgresAccountRepository, PostgresAdWatchLogRepository, PostgresCompletionLogRepository,
    PostgresMilestoneRepository, PostgresTaskRepository,
};
use tage_core::services::{
    AccountService, AdService, LeaderboardService, LedgerConfig, MilestoneService, RewardService,
    TaskService,
};

mod context;
mod routes;
mod server;

use context::{AppConfig, AppContext};

#[derive(Parser, Debug, Clone)]
#[command(name = "tage-backend")]
#[command(author, version, about = "Tage rewards ledger backend")]
struct Args {
    /// Address to which the server will bind
    #[arg(long, default_value = "0.0.0.0:3000", env = "SERVER_ADDR")]
    server_addr: String,

    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL")]
    db_path: String,

    /// Shared secret for /admin/execute.
    #[arg(long, env = "ADMIN_SECRET_KEY")]
    admin_secret: Option<String>,

    /// Telegram id allowed to use /admin/execute.
    #[arg(long, default_value = "1755569721", env = "ADMIN_TELEGRAM_ID")]
    admin_telegram_id: i64,

    /// Bot token; enables signature checks and outbound messaging.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Column the users table is keyed by.
    #[arg(long, default_value = "telegram_id", env = "USERS_ID_COLUMN")]
    users_id_column: String,

    /// Legacy identifier column to fall back to (one-time migration shim).
    #[arg(long, env = "USERS_LEGACY_ID_COLUMN")]
    users_legacy_id_column: Option<String>,

    /// Comma-separated CORS origin allowlist; unset means any origin.
    #[arg(long, env = "CORS_ALLOWED_ORIGINS")]
    cors_allowed_origins: Option<String>,

    /// Public base URL; when set together with the bot token, the
    /// Telegram webhook is registered at startup.
    #[arg(long, env = "WEBHOOK_BASE_URL")]
    webhook_base_url: Option<String>,

    /// Enable the bot integration (webhook registration + replies).
    #[arg(long, default_value = "false", env = "ENABLE_BOT")]
    enable_bot: bool,

    #[arg(long, default_value = "500", env = "AD_REWARD_POINTS")]
    ad_reward_points: i64,

    #[arg(long, default_value = "10", env = "AD_DAILY_CAP")]
    ad_daily_cap: i32,

    #[arg(long, default_value = "1000", env = "TASK_DEFAULT_REWARD")]
    task_default_reward: i64,

    #[arg(long, default_value = "10", env = "ONBOARDING_POINTS_PER_DAY")]
    onboarding_points_per_day: i64,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("tage=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let db = Database::new(&args.db_path).await?;
    db.migrate().await?;

    let ledger = LedgerConfig {
        ad_reward_points: args.ad_reward_points,
        ad_daily_cap: args.ad_daily_cap,
        task_default_reward: args.task_default_reward,
        onboarding_points_per_day: args.onboarding_points_per_day,
    };

    let account_repo = Arc::new(PostgresAccountRepository::with_id_columns(
        db.pool().clone(),
        &args.users_id_column,
        args.users_legacy_id_column.as_deref(),
    ));
    let completion_repo = Arc::new(PostgresCompletionLogRepository::new(db.pool().clone()));
    let task_repo = Arc::new(PostgresTaskRepository::new(db.pool().clone()));
    let milestone_repo = Arc::new(PostgresMilestoneRepository::new(db.pool().clone()));
    let ad_log_repo = Arc::new(PostgresAdWatchLogRepository::new(db.pool().clone()));

    let rewards = Arc::new(RewardService::new(account_repo.clone()));

    let telegram = match (&args.bot_token, args.enable_bot) {
        (Some(token), true) => {
            let http = Arc::new(DefaultHttpClient::new());
            Some(Arc::new(TelegramNotifier::new(http, token)))
        }
        (Some(_), false) => {
            info!("Bot token present but bot integration disabled");
            None
        }
        _ => None,
    };

    if let (Some(telegram), Some(base_url)) = (&telegram, &args.webhook_base_url) {
        // Startup-time best effort; a failed registration should not keep
        // the ledger API down.
        if let Err(e) = telegram.set_webhook(base_url).await {
            warn!("Webhook registration failed: {}", e);
        }
    }

    let notifier: Option<Arc<dyn Notifier>> = telegram.map(|t| t as Arc<dyn Notifier>);

    let ctx = Arc::new(AppContext {
        accounts: AccountService::new(account_repo.clone(), ledger.clone()),
        tasks: TaskService::new(
            account_repo.clone(),
            completion_repo.clone(),
            task_repo.clone(),
            rewards.clone(),
            ledger.clone(),
        ),
        ads: AdService::new(
            account_repo.clone(),
            ad_log_repo,
            rewards.clone(),
            ledger.clone(),
        ),
        milestones: MilestoneService::new(account_repo.clone(), milestone_repo, rewards),
        leaderboard: LeaderboardService::new(account_repo),
        completions: completion_repo,
        task_repo,
        notifier,
        db: db.clone(),
        config: AppConfig {
            bot_token: args.bot_token.clone(),
            admin_secret: args.admin_secret.clone(),
            admin_telegram_id: args.admin_telegram_id,
            webhook_base_url: args.webhook_base_url.clone(),
            ledger,
        },
    });

    let cors_origins = args.cors_allowed_origins.as_ref().map(|s| {
        s.split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
    });

    let app = server::build_router(ctx, cors_origins);
    let addr: SocketAddr = args.server_addr.parse()?;
    server::run_server(addr, app).await
}
