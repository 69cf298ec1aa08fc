use axum::{routing::get, Router};

use crate::handlers::callback_handlers;
use crate::state::AppState;

pub fn mpesa_routes() -> Router<AppState> {
    Router::new().route(
        "/callback",
        get(callback_handlers::callback_health).post(callback_handlers::mpesa_callback),
    )
}
