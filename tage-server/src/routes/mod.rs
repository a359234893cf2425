// tage-server/src/routes/mod.rs

pub mod accounts;
pub mod admin;
pub mod queries;
pub mod rewards;
pub mod webhook;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::context::AppContext;
use tage_common::Error;

/// Wrapper that maps ledger errors onto HTTP statuses. The underlying
/// message is passed through verbatim, matching the behavior this
/// service has always had.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_)
            | Error::Parse(_)
            | Error::InvalidReward(_)
            | Error::DailyLimit(_)
            | Error::MilestoneUnmet(_)
            | Error::MilestoneClaimed(_) => StatusCode::BAD_REQUEST,
            Error::Auth(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Gate for every client-reachable mutating endpoint: the request body
/// must carry an `initData` blob that verifies against the bot token.
/// Missing token or payload fails closed.
pub fn require_signed(ctx: &AppContext, init_data: Option<&str>) -> Result<(), ApiError> {
    let token = ctx.config.bot_token.as_deref().unwrap_or("");
    if !tage_core::auth::verify_init_data(init_data.unwrap_or(""), token) {
        return Err(Error::Auth("Invalid signature".to_string()).into());
    }
    Ok(())
}
