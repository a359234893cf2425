// tage-core/src/repositories/postgres/mod.rs

pub mod account;
pub mod ad_watch_log;
pub mod completion_log;
pub mod milestone;
pub mod task;
