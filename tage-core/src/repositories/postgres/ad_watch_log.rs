// tage-core/src/repositories/postgres/ad_watch_log.rs

use sqlx::{Pool, Postgres};

use tage_common::models::completion::AdWatchEntry;
use tage_common::traits::repository_traits::AdWatchLogRepository;

use crate::Error;

/// Best-effort ad-watch log. Some deployments never created this table;
/// the service layer downgrades append failures to a warning.
pub struct PostgresAdWatchLogRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresAdWatchLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AdWatchLogRepository for PostgresAdWatchLogRepository {
    async fn append(&self, entry: &AdWatchEntry) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO ad_watch_log (telegram_id, watched_at)
            VALUES ($1, $2)
            "#,
        )
            .bind(entry.telegram_id)
            .bind(entry.watched_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
