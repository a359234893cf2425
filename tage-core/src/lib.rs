// tage-core/src/lib.rs

pub mod auth;
pub mod db;
pub mod http;
pub mod notifier;
pub mod repositories;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use http::{DefaultHttpClient, HttpClient};
pub use tage_common::Error;
