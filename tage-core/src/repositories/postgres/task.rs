// tage-core/src/repositories/postgres/task.rs

use sqlx::{Pool, Postgres};

use tage_common::models::task::Task;
use tage_common::traits::repository_traits::TaskRepository;

use crate::Error;

pub struct PostgresTaskRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresTaskRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO tasks (task_id, title, link, points, category)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
            .bind(&task.task_id)
            .bind(&task.title)
            .bind(&task.link)
            .bind(task.points)
            .bind(&task.category)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>, Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT task_id, title, link, points, category
            FROM tasks
            WHERE task_id = $1
            "#,
        )
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_all(&self) -> Result<Vec<Task>, Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT task_id, title, link, points, category
            FROM tasks
            ORDER BY task_id ASC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }
}
