// tage-server/src/server.rs

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use tage_common::Error;

use crate::context::AppContext;
use crate::routes;

/// Build the full API router. Several endpoints are aliases kept for
/// older mini-app clients; they share handlers.
pub fn build_router(ctx: Arc<AppContext>, cors_origins: Option<Vec<String>>) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/register", post(routes::accounts::register))
        .route("/check-user", post(routes::accounts::check_user))
        .route("/user-init", post(routes::accounts::user_init))
        .route("/auth", post(routes::accounts::auth))
        .route("/bind-referrer", post(routes::accounts::bind_referrer))
        .route("/user-balance", get(routes::accounts::user_balance))
        .route("/complete-task", post(routes::rewards::complete_task))
        .route("/claim-task", post(routes::rewards::claim_task))
        .route("/claim-onboarding", post(routes::rewards::claim_onboarding))
        .route("/watch-ad", post(routes::rewards::watch_ad))
        .route("/add-ad-reward", post(routes::rewards::watch_ad))
        .route("/record-action", post(routes::rewards::record_action))
        .route("/leaderboard", get(routes::queries::leaderboard))
        .route("/get-tasks", get(routes::queries::get_tasks))
        .route("/get-available-tasks", get(routes::queries::get_available_tasks))
        .route("/health", get(routes::queries::health))
        .route("/admin/execute", post(routes::admin::execute))
        .route("/bot/webhook", post(routes::webhook::bot_webhook))
        .with_state(ctx)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

fn build_cors(origins: Option<Vec<String>>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    match origins {
        Some(list) if !list.is_empty() => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(v) => Some(v),
                    Err(_) => {
                        error!("Ignoring invalid CORS origin '{}'", o);
                        None
                    }
                })
                .collect();
            base.allow_origin(values)
        }
        // Historical default: the API is open to any origin.
        _ => base.allow_origin(Any),
    }
}

pub async fn run_server(addr: SocketAddr, app: Router) -> Result<(), Error> {
    info!("Rewards API listening on http://{}", addr);
    axum_server::Server::bind(addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
