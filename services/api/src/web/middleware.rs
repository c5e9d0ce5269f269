//! services/api/src/web/middleware.rs
//!
//! Session middleware for every route.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// The raw cookie value, kept next to the resolved `Session` so logout can
/// end the right server-side session.
#[derive(Clone, Debug, Default)]
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Reads the session token out of the `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// Middleware that resolves the auth session cookie into a `Session`.
///
/// It never rejects a request: a missing, unknown or expired cookie becomes
/// `Session::Anonymous`, and the core decides what an anonymous caller may do.
/// Both the `Session` and the `SessionToken` are inserted into request extensions.
pub async fn resolve_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers());
    let session = state.sessions.resolve(token.as_deref()).await?;

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(SessionToken(token));

    Ok(next.run(req).await)
}
