// tage-server/src/routes/queries.rs

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::routes::ApiResult;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// GET /leaderboard?type=total|refs
pub async fn leaderboard(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Value>> {
    let kind = query.kind.as_deref().unwrap_or("total");
    let body = if kind == "refs" {
        serde_json::to_value(ctx.leaderboard.top_by_referrals().await?)
    } else {
        serde_json::to_value(ctx.leaderboard.top_by_points().await?)
    };
    Ok(Json(body.map_err(tage_common::Error::from)?))
}

#[derive(Debug, Deserialize)]
pub struct GetTasksQuery {
    pub uid: i64,
}

/// GET /get-tasks?uid=: full task list with a per-user claimed flag.
pub async fn get_tasks(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<GetTasksQuery>,
) -> ApiResult<Json<Value>> {
    let account = ctx.accounts.require(query.uid).await?;
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let tasks: Vec<Value> = ctx
        .tasks
        .list_tasks()
        .await?
        .into_iter()
        .map(|t| {
            let dated = format!("{}:{}", t.task_id, today);
            let claimed = account
                .completed_tasks
                .iter()
                .any(|k| *k == dated || *k == t.task_id);
            let mut v = serde_json::to_value(&t).unwrap_or_else(|_| json!({}));
            if let Value::Object(map) = &mut v {
                map.insert("claimed".to_string(), json!(claimed));
            }
            v
        })
        .collect();

    Ok(Json(json!(tasks)))
}

#[derive(Debug, Deserialize)]
pub struct AvailableTasksQuery {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// GET /get-available-tasks?userId=: tasks minus the user's claimed set.
pub async fn get_available_tasks(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<AvailableTasksQuery>,
) -> ApiResult<Json<Value>> {
    let tasks = ctx.tasks.available_tasks(query.user_id).await?;
    Ok(Json(serde_json::to_value(tasks).map_err(tage_common::Error::from)?))
}

/// GET /health: configuration presence and store reachability, no
/// secret values echoed back.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let db_ok = sqlx::query("SELECT 1")
        .execute(ctx.db.pool())
        .await
        .is_ok();

    Json(json!({
        "ok": db_ok,
        "db": db_ok,
        "bot_configured": ctx.config.bot_token.is_some(),
        "admin_secret_configured": ctx.config.admin_secret.is_some(),
        "webhook_configured": ctx.config.webhook_base_url.is_some(),
    }))
}
