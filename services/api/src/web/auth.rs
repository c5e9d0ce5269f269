//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, logout and the session check.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use photo_sharing_core::{
    LoginCredentials, Registration, RegistrationForm, Session, SessionManager,
};
use std::sync::Arc;

use crate::error::{ApiError, ErrorBody};
use crate::web::dto::{IdentityResponse, LoginRequest, MessageResponse, RegisterRequest};
use crate::web::middleware::{SessionToken, SESSION_COOKIE};
use crate::web::state::AppState;

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /user - Register a new account
#[utoipa::path(
    post,
    path = "/user",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = IdentityResponse),
        (status = 400, description = "Missing fields, password mismatch or login name taken", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let registration = Registration::try_from_form(RegistrationForm::from(req))?;
    let identity = state.engine.register_user(registration).await?;
    Ok(Json(IdentityResponse::from(identity)))
}

/// POST /admin/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = IdentityResponse),
        (status = 400, description = "Missing fields or invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let credentials = LoginCredentials::try_from_parts(&req.login_name, &req.password)?;
    let outcome = state.sessions.login(&credentials).await?;

    let cookie = session_cookie(&outcome.token, state.sessions.ttl().num_seconds());
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(IdentityResponse::from(outcome.identity)),
    ))
}

/// POST /admin/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 200, description = "Logout successful, session cookie cleared", body = MessageResponse),
        (status = 400, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(token): Extension<SessionToken>,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.logout(&session, token.as_deref()).await?;

    let cookie = session_cookie("", 0);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// GET /admin/check - Return the identity behind the current session
#[utoipa::path(
    get,
    path = "/admin/check",
    responses(
        (status = 200, description = "Session is valid", body = IdentityResponse),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn check_handler(
    Extension(session): Extension<Session>,
) -> Result<Json<IdentityResponse>, ApiError> {
    let identity = SessionManager::current_identity(&session)?;
    Ok(Json(IdentityResponse::from(identity)))
}
