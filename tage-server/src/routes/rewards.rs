// tage-server/src/routes/rewards.rs

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use tage_common::models::completion::CompletionRecord;
use tage_core::services::{ClaimMode, TaskClaimOutcome};

use crate::context::AppContext;
use crate::routes::{require_signed, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CompleteTaskBody {
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
    pub telegram_id: i64,
    pub task_id: String,
}

/// POST /complete-task: dated daily claim with the configured default
/// reward. A repeat claim the same day is a `success: false` body, not
/// an HTTP failure.
pub async fn complete_task(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CompleteTaskBody>,
) -> ApiResult<Json<Value>> {
    require_signed(&ctx, body.init_data.as_deref())?;

    let outcome = ctx
        .tasks
        .claim_default(body.telegram_id, &body.task_id)
        .await?;

    Ok(Json(claim_response(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct ClaimTaskBody {
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
    pub telegram_id: i64,
    pub task_id: Option<String>,
    pub task_reward: Option<i64>,
}

/// POST /claim-task: dated daily claim with a client-supplied reward
/// amount, falling back to the task's configured points.
pub async fn claim_task(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ClaimTaskBody>,
) -> ApiResult<Json<Value>> {
    require_signed(&ctx, body.init_data.as_deref())?;

    let task_id = body.task_id.as_deref().unwrap_or("generic");
    let outcome = ctx
        .tasks
        .claim(body.telegram_id, task_id, body.task_reward, ClaimMode::Daily)
        .await?;

    Ok(Json(claim_response(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct ClaimOnboardingBody {
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
    pub telegram_id: i64,
}

/// POST /claim-onboarding: one-shot bonus sized by the account's
/// pseudo-age. Blocked forever once claimed.
pub async fn claim_onboarding(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ClaimOnboardingBody>,
) -> ApiResult<Json<Value>> {
    require_signed(&ctx, body.init_data.as_deref())?;

    let account = ctx.accounts.require(body.telegram_id).await?;
    let reward =
        i64::from(account.account_age_days) * ctx.config.ledger.onboarding_points_per_day;

    let outcome = ctx
        .tasks
        .claim(body.telegram_id, "onboarding", Some(reward), ClaimMode::Once)
        .await?;

    Ok(Json(claim_response(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct WatchAdBody {
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
    pub telegram_id: i64,
}

/// POST /watch-ad (alias /add-ad-reward): daily-capped ad reward.
pub async fn watch_ad(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<WatchAdBody>,
) -> ApiResult<Json<Value>> {
    require_signed(&ctx, body.init_data.as_deref())?;

    let receipt = ctx.ads.watch(body.telegram_id).await?;
    Ok(Json(json!({
        "success": true,
        "newPoints": receipt.new_points,
        "watchedToday": receipt.watched_today,
    })))
}

#[derive(Debug, Deserialize)]
pub struct RecordActionBody {
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
    pub telegram_id: i64,
    pub action_id: String,
}

/// POST /record-action: bare completion-log append, no reward attached.
pub async fn record_action(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RecordActionBody>,
) -> ApiResult<Json<Value>> {
    require_signed(&ctx, body.init_data.as_deref())?;

    ctx.completions
        .append(&CompletionRecord::new(body.telegram_id, &body.action_id))
        .await?;
    debug!(telegram_id = body.telegram_id, action = %body.action_id, "action recorded");
    Ok(Json(json!({ "success": true })))
}

fn claim_response(outcome: TaskClaimOutcome) -> Value {
    match outcome {
        TaskClaimOutcome::Claimed {
            reward,
            new_points,
            claimed_keys,
        } => json!({
            "success": true,
            "reward": reward,
            "newPoints": new_points,
            "claimedKeys": claimed_keys,
        }),
        TaskClaimOutcome::AlreadyClaimed => json!({
            "success": false,
            "message": "Task already claimed",
        }),
    }
}
