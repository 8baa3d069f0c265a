//! Session handlers and the session cookie.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use vista_core::session::{SessionId, SessionSummary, Warning};

use super::form::parse_form;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "vista_session";

/// Value of the session cookie, if the request carries one.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then_some(value)
        })
}

/// Resolve (or start) the caller's session.
pub fn resolve_session(state: &AppState, headers: &HeaderMap) -> (SessionId, bool) {
    state.sessions().resolve(session_cookie(headers))
}

/// Attach `Set-Cookie` when the session was just created.
pub fn with_session_cookie(mut response: Response, id: SessionId, created: bool) -> Response {
    if created {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Strict", SESSION_COOKIE, id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

#[derive(Serialize)]
pub struct WarningView {
    #[serde(flatten)]
    pub warning: Warning,
    pub message: String,
}

impl From<Warning> for WarningView {
    fn from(warning: Warning) -> Self {
        let message = warning.message();
        Self { warning, message }
    }
}

#[derive(Serialize)]
pub struct SessionUpdateResponse {
    pub warnings: Vec<WarningView>,
    pub session: Option<SessionSummary>,
}

pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = resolve_session(&state, &headers);
    let response = Json(state.sessions().summary(id)).into_response();
    with_session_cookie(response, id, created)
}

/// Apply field changes without requesting an analysis.
pub async fn update_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, (StatusCode, String)> {
    let (id, created) = resolve_session(&state, &headers);
    let form = parse_form(multipart).await?;

    let submission = state.sessions().submit(id, form.update, false);
    let warnings = form
        .warnings
        .into_iter()
        .chain(submission.warnings)
        .map(WarningView::from)
        .collect();

    let body = SessionUpdateResponse { warnings, session: state.sessions().summary(id) };
    Ok(with_session_cookie(Json(body).into_response(), id, created))
}

pub async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let ended = session_cookie(&headers)
        .and_then(|c| c.parse::<SessionId>().ok())
        .is_some_and(|id| state.sessions().end(id));
    if ended {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Raw bytes of the current upload, for the page preview.
pub async fn get_session_image(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(id) = session_cookie(&headers).and_then(|c| c.parse::<SessionId>().ok()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match state.sessions().image(id) {
        Some(image) => (
            [
                (header::CONTENT_TYPE, image.kind().mime_type()),
                (header::CACHE_CONTROL, "no-store"),
            ],
            image.bytes().clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
