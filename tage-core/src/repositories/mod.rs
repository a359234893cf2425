// tage-core/src/repositories/mod.rs

pub use tage_common::traits::repository_traits::{
    AccountRepository,
    AdWatchLogRepository,
    CompletionLogRepository,
    MilestoneRepository,
    TaskRepository,
};

pub use postgres::account::PostgresAccountRepository;
pub use postgres::ad_watch_log::PostgresAdWatchLogRepository;
pub use postgres::completion_log::PostgresCompletionLogRepository;
pub use postgres::milestone::PostgresMilestoneRepository;
pub use postgres::task::PostgresTaskRepository;

pub mod postgres;
