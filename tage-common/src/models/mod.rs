// tage-common/src/models/mod.rs

pub mod account;
pub mod completion;
pub mod milestone;
pub mod task;

pub use account::{Account, AccountStatus};
pub use completion::{AdWatchEntry, CompletionRecord};
pub use milestone::{Milestone, MilestoneClaim, MILESTONES};
pub use task::Task;
