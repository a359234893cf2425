// tage-server/src/routes/admin.rs

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use tage_common::models::account::AccountStatus;
use tage_common::models::task::Task;
use tage_common::Error;
use tage_core::notifier::send_fire_and_forget;

use crate::context::AppContext;
use crate::routes::ApiResult;

#[derive(Debug, Deserialize)]
pub struct AdminBody {
    pub auth_key: Option<String>,
    pub admin_id: Option<i64>,
    pub action: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
struct UidPayload {
    uid: i64,
}

#[derive(Debug, Deserialize)]
struct MilestonePayload {
    uid: i64,
    milestone_key: String,
}

#[derive(Debug, Deserialize)]
struct BroadcastPayload {
    text: String,
}

/// POST /admin/execute: single multiplexed admin endpoint, gated by the
/// shared secret plus the configured administrator id.
pub async fn execute(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<AdminBody>,
) -> ApiResult<Json<Value>> {
    let secret = ctx
        .config
        .admin_secret
        .as_deref()
        .ok_or_else(|| Error::Auth("Admin access not configured".to_string()))?;

    if body.auth_key.as_deref() != Some(secret)
        || body.admin_id != Some(ctx.config.admin_telegram_id)
    {
        return Err(Error::Auth("Unauthorized".to_string()).into());
    }

    info!(action = %body.action, "admin action");

    match body.action.as_str() {
        "add_task" => {
            let task: Task = serde_json::from_value(body.payload).map_err(Error::from)?;
            ctx.task_repo.create(&task).await?;
            Ok(Json(json!({ "success": true })))
        }
        "ban_user" => {
            let p: UidPayload = serde_json::from_value(body.payload).map_err(Error::from)?;
            ctx.accounts.set_status(p.uid, AccountStatus::Banned).await?;
            Ok(Json(json!({ "success": true })))
        }
        "unban_user" => {
            let p: UidPayload = serde_json::from_value(body.payload).map_err(Error::from)?;
            ctx.accounts.set_status(p.uid, AccountStatus::Active).await?;
            Ok(Json(json!({ "success": true })))
        }
        "get_users" => {
            let mut users = ctx.accounts.list_all().await?;
            users.sort_by(|a, b| b.points.cmp(&a.points));
            Ok(Json(serde_json::to_value(users).map_err(Error::from)?))
        }
        "get_detailed_users" => {
            let users = ctx.accounts.list_all().await?;
            Ok(Json(serde_json::to_value(users).map_err(Error::from)?))
        }
        "claim_milestone" => {
            let p: MilestonePayload = serde_json::from_value(body.payload).map_err(Error::from)?;
            let receipt = ctx.milestones.claim(p.uid, &p.milestone_key).await?;
            Ok(Json(json!({
                "success": true,
                "reward": receipt.reward,
                "newPoints": receipt.new_points,
            })))
        }
        "broadcast" => {
            let p: BroadcastPayload = serde_json::from_value(body.payload).map_err(Error::from)?;
            let notifier = ctx
                .notifier
                .clone()
                .ok_or_else(|| Error::Config("No bot token configured".to_string()))?;
            let users = ctx.accounts.list_all().await?;
            let count = users.len();
            for user in users {
                send_fire_and_forget(notifier.clone(), user.telegram_id, p.text.clone());
            }
            Ok(Json(json!({ "success": true, "queued": count })))
        }
        other => Err(Error::Validation(format!("Unknown action '{}'", other)).into()),
    }
}
