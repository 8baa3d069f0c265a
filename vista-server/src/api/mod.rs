//! API Routes
//!
//! Session management and the streaming analysis endpoint used by the page.

pub(crate) mod analyze;
pub(crate) mod form;
pub(crate) mod session;


use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // Session
        .route(
            "/session",
            get(session::get_session).post(session::update_session).delete(session::end_session),
        )
        .route("/session/image", get(session::get_session_image))
        // Analysis
        .route("/analyze", post(analyze::analyze))
        // API fallback: return 404 for unknown API endpoints
        .fallback(api_not_found)
}

async fn api_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({"error": "Not found"})))
}
