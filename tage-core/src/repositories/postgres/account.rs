// tage-core/src/repositories/postgres/account.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;

use tage_common::models::account::{Account, AccountStatus};
use tage_common::traits::repository_traits::AccountRepository;

use crate::Error;

/// Column list for account SELECTs. The id column is aliased to
/// `telegram_id` so `row_to_account` decodes the same shape regardless
/// of which physical column (primary or legacy) the row is keyed under.
/// A legacy-keyed row has NULL in the primary column until it is
/// migrated, so selecting the primary column literally would fail to
/// decode exactly the rows the fallback exists for.
fn select_columns(id_column: &str) -> String {
    format!(
        "{id_column} AS telegram_id, username, points, referred_by, \
         ads_watched_today, last_ad_date, completed_tasks, status, \
         account_age_days, created_at"
    )
}

/// Postgres-backed account store.
///
/// Older deployments of this schema keyed `users` by a differently named
/// identifier column. The repository is configured with the column name
/// it should query by, plus an optional legacy column: a miss on the
/// primary column triggers exactly one fallback lookup against the legacy
/// column, and a hit there rewrites the row in place so the next lookup
/// takes the fast path. Services above this type never see any of it.
pub struct PostgresAccountRepository {
    pub pool: Pool<Postgres>,
    id_column: String,
    legacy_id_column: Option<String>,
}

impl PostgresAccountRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            id_column: "telegram_id".to_string(),
            legacy_id_column: None,
        }
    }

    pub fn with_id_columns(
        pool: Pool<Postgres>,
        id_column: &str,
        legacy_id_column: Option<&str>,
    ) -> Self {
        Self {
            pool,
            id_column: id_column.to_string(),
            legacy_id_column: legacy_id_column.map(String::from),
        }
    }

    fn row_to_account(row: &PgRow) -> Result<Account, Error> {
        let status: String = row.try_get("status")?;
        let completed: serde_json::Value = row.try_get("completed_tasks")?;
        let completed_tasks: Vec<String> = serde_json::from_value(completed)?;

        Ok(Account {
            telegram_id: row.try_get("telegram_id")?,
            username: row.try_get("username")?,
            points: row.try_get("points")?,
            referred_by: row.try_get("referred_by")?,
            ads_watched_today: row.try_get("ads_watched_today")?,
            last_ad_date: row.try_get::<Option<NaiveDate>, _>("last_ad_date")?,
            completed_tasks,
            status: AccountStatus::parse(&status),
            account_age_days: row.try_get("account_age_days")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    async fn fetch_by_column(
        &self,
        column: &str,
        telegram_id: i64,
    ) -> Result<Option<Account>, Error> {
        // Column names come from config, not the request, so interpolating
        // them is safe; the id itself is always bound.
        let sql = format!(
            "SELECT {} FROM users WHERE {column} = $1",
            select_columns(column)
        );
        let row = sqlx::query(&sql)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_account(&r)?)),
            None => Ok(None),
        }
    }

    async fn migrate_legacy_row(&self, legacy_column: &str, telegram_id: i64) -> Result<(), Error> {
        let sql = format!(
            "UPDATE users SET {id_col} = {legacy} WHERE {legacy} = $1",
            id_col = self.id_column,
            legacy = legacy_column,
        );
        sqlx::query(&sql)
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;
        info!(telegram_id, "migrated account row from legacy column '{}'", legacy_column);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: &Account) -> Result<(), Error> {
        // New rows always land under the configured primary column.
        let sql = format!(
            "INSERT INTO users ( \
                {}, username, points, referred_by, \
                ads_watched_today, last_ad_date, completed_tasks, status, \
                account_age_days, created_at \
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            self.id_column
        );
        sqlx::query(&sql)
            .bind(account.telegram_id)
            .bind(&account.username)
            .bind(account.points)
            .bind(account.referred_by)
            .bind(account.ads_watched_today)
            .bind(account.last_ad_date)
            .bind(serde_json::to_value(&account.completed_tasks)?)
            .bind(account.status.as_str())
            .bind(account.account_age_days)
            .bind(account.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, telegram_id: i64) -> Result<Option<Account>, Error> {
        if let Some(account) = self.fetch_by_column(&self.id_column, telegram_id).await? {
            return Ok(Some(account));
        }

        // One-time schema shim: a miss may be a row written under the old
        // column name. Migrate it forward on first touch.
        if let Some(legacy) = self.legacy_id_column.clone() {
            if let Some(account) = self.fetch_by_column(&legacy, telegram_id).await? {
                self.migrate_legacy_row(&legacy, telegram_id).await?;
                return Ok(Some(account));
            }
        }

        Ok(None)
    }

    async fn update_username(&self, telegram_id: i64, username: &str) -> Result<(), Error> {
        let sql = format!(
            "UPDATE users SET username = $1 WHERE {} = $2",
            self.id_column
        );
        sqlx::query(&sql)
            .bind(username)
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn bind_referrer(&self, telegram_id: i64, referrer_id: i64) -> Result<bool, Error> {
        // First write wins: the IS NULL guard makes re-binds a no-op.
        let sql = format!(
            "UPDATE users SET referred_by = $1 WHERE {} = $2 AND referred_by IS NULL",
            self.id_column
        );
        let result = sqlx::query(&sql)
            .bind(referrer_id)
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn add_points(&self, telegram_id: i64, amount: i64) -> Result<(), Error> {
        // Atomic in-store increment; no read-modify-write race here.
        let sql = format!(
            "UPDATE users SET points = points + $1 WHERE {} = $2",
            self.id_column
        );
        sqlx::query(&sql)
            .bind(amount)
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_completed_tasks(&self, telegram_id: i64, keys: &[String]) -> Result<(), Error> {
        let sql = format!(
            "UPDATE users SET completed_tasks = $1 WHERE {} = $2",
            self.id_column
        );
        sqlx::query(&sql)
            .bind(serde_json::to_value(keys)?)
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_ad_counter(
        &self,
        telegram_id: i64,
        watched_today: i32,
        last_ad_date: NaiveDate,
    ) -> Result<(), Error> {
        let sql = format!(
            "UPDATE users SET ads_watched_today = $1, last_ad_date = $2 WHERE {} = $3",
            self.id_column
        );
        sqlx::query(&sql)
            .bind(watched_today)
            .bind(last_ad_date)
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_status(&self, telegram_id: i64, status: AccountStatus) -> Result<(), Error> {
        let sql = format!(
            "UPDATE users SET status = $1 WHERE {} = $2",
            self.id_column
        );
        sqlx::query(&sql)
            .bind(status.as_str())
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_referrals(&self, telegram_id: i64) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM users WHERE referred_by = $1")
            .bind(telegram_id)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("cnt")?;
        Ok(count)
    }

    async fn top_by_points(&self, limit: i64) -> Result<Vec<Account>, Error> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY points DESC, telegram_id ASC LIMIT $1",
            select_columns(&self.id_column)
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_account).collect()
    }

    async fn list_all(&self) -> Result<Vec<Account>, Error> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            select_columns(&self.id_column)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_account).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_aliases_id_column() {
        let cols = select_columns("user_id");
        assert!(cols.starts_with("user_id AS telegram_id,"));

        // The fallback lookup must decode rows whose primary column is
        // NULL, so the legacy column has to be the one surfaced as
        // telegram_id.
        let cols = select_columns("legacy_uid");
        assert!(cols.starts_with("legacy_uid AS telegram_id,"));
        assert!(!cols.contains(", telegram_id,"));
    }
}
