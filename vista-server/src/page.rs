//! The analysis page.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};

use crate::api::session::{resolve_session, with_session_cookie};
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Serve the page and start a session for first-time visitors.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = resolve_session(&state, &headers);
    with_session_cookie(Html(INDEX_HTML).into_response(), id, created)
}
