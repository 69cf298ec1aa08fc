use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use axum::extract::State;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::mpesa_handlers;
use crate::state::AppState;

pub mod mpesa;

pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/stkpush", post(mpesa_handlers::initiate_stk_push))
        .nest("/api/mpesa", mpesa::mpesa_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn root_handler() -> &'static str {
    "M-Pesa STK Push relay"
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "environment": state.config.mpesa_environment.as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
