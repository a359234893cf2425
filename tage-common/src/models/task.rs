use serde::{Deserialize, Serialize};

/// Sponsored task definition. Managed through `/admin/execute`,
/// read-only to regular users.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Task {
    pub task_id: String,
    pub title: String,
    pub link: Option<String>,
    pub points: i64,
    pub category: Option<String>,
}
