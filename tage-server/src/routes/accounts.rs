// tage-server/src/routes/accounts.rs

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::routes::ApiResult;
use tage_common::Error;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub referrer_id: Option<i64>,
}

/// POST /register: upsert, responds with the raw account record.
pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<Json<Value>> {
    let (account, _) = ctx
        .accounts
        .upsert(
            body.telegram_id,
            body.username.as_deref().unwrap_or(""),
            body.referrer_id,
        )
        .await?;
    Ok(Json(serde_json::to_value(account).map_err(Error::from)?))
}

/// POST /check-user: upsert plus the caller's referral count.
pub async fn check_user(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<Json<Value>> {
    let (account, is_new) = ctx
        .accounts
        .upsert(
            body.telegram_id,
            body.username.as_deref().unwrap_or(""),
            body.referrer_id,
        )
        .await?;
    let ref_count = ctx.accounts.referral_count(body.telegram_id).await?;
    Ok(Json(json!({
        "isNewUser": is_new,
        "user": account,
        "ref_count": ref_count,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UserInitBody {
    pub uid: i64,
    pub username: Option<String>,
    pub referrer_id: Option<i64>,
}

/// POST /user-init: upsert variant with a `Guest` default name; the
/// response flattens the account record and adds `isNewUser`/`status`.
pub async fn user_init(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<UserInitBody>,
) -> ApiResult<Json<Value>> {
    let (account, is_new) = ctx
        .accounts
        .upsert(
            body.uid,
            body.username.as_deref().unwrap_or("Guest"),
            body.referrer_id,
        )
        .await?;

    let status = account.status;
    let mut value = serde_json::to_value(account).map_err(Error::from)?;
    if let Value::Object(map) = &mut value {
        map.insert("isNewUser".to_string(), json!(is_new));
        map.insert("status".to_string(), json!(status));
    }
    Ok(Json(value))
}

#[derive(Debug, Deserialize)]
pub struct AuthBody {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: Option<String>,
}

/// POST /auth: lookup-or-create with the pseudo-age onboarding balance.
pub async fn auth(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<AuthBody>,
) -> ApiResult<Json<Value>> {
    let account = ctx
        .accounts
        .auth(body.user_id, body.username.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(serde_json::to_value(account).map_err(Error::from)?))
}

#[derive(Debug, Deserialize)]
pub struct BindReferrerBody {
    pub uid: i64,
    pub referrer_id: i64,
}

/// POST /bind-referrer: one-shot referral binding.
pub async fn bind_referrer(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<BindReferrerBody>,
) -> ApiResult<Json<Value>> {
    let outcome = ctx.accounts.bind_referrer(body.uid, body.referrer_id).await?;
    Ok(Json(json!({
        "success": true,
        "alreadyBound": outcome.already_bound,
        "referred_by": outcome.referred_by,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UidQuery {
    pub uid: i64,
}

/// GET /user-balance?uid=
pub async fn user_balance(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<UidQuery>,
) -> ApiResult<Json<Value>> {
    let account = ctx.accounts.require(query.uid).await?;
    Ok(Json(json!({
        "uid": account.telegram_id,
        "points": account.points,
    })))
}
