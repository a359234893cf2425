// tage-core/src/repositories/postgres/milestone.rs

use sqlx::{Pool, Postgres, Row};

use tage_common::models::milestone::MilestoneClaim;
use tage_common::traits::repository_traits::MilestoneRepository;

use crate::Error;

/// Milestone claim rows are immutable once inserted; the unique index on
/// (telegram_id, milestone_key) enforces at-most-one claim per pair.
pub struct PostgresMilestoneRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresMilestoneRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MilestoneRepository for PostgresMilestoneRepository {
    async fn insert(&self, claim: &MilestoneClaim) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO milestone_claims (telegram_id, milestone_key, claimed_at)
            VALUES ($1, $2, $3)
            "#,
        )
            .bind(claim.telegram_id)
            .bind(&claim.milestone_key)
            .bind(claim.claimed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn exists(&self, telegram_id: i64, milestone_key: &str) -> Result<bool, Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt
            FROM milestone_claims
            WHERE telegram_id = $1 AND milestone_key = $2
            "#,
        )
            .bind(telegram_id)
            .bind(milestone_key)
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("cnt")?;
        Ok(count > 0)
    }
}
