// tage-core/src/repositories/postgres/completion_log.rs

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use tage_common::models::completion::CompletionRecord;
use tage_common::traits::repository_traits::CompletionLogRepository;

use crate::Error;

/// Append-only completion log. Rows are never updated or deleted; the
/// rolling claim window is a timestamp filter at query time.
pub struct PostgresCompletionLogRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresCompletionLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CompletionLogRepository for PostgresCompletionLogRepository {
    async fn append(&self, record: &CompletionRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO completion_log (telegram_id, task_id, completed_at)
            VALUES ($1, $2, $3)
            "#,
        )
            .bind(record.telegram_id)
            .bind(&record.task_id)
            .bind(record.completed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn claimed_within(
        &self,
        telegram_id: i64,
        task_id: &str,
        window: Duration,
    ) -> Result<bool, Error> {
        let cutoff = Utc::now() - window;
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt
            FROM completion_log
            WHERE telegram_id = $1
              AND task_id = $2
              AND completed_at > $3
            "#,
        )
            .bind(telegram_id)
            .bind(task_id)
            .bind(cutoff)
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("cnt")?;
        Ok(count > 0)
    }
}
