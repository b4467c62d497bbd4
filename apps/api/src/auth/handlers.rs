use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::{clear_session_cookie, session_cookie, token_from_headers, SessionContext};
use crate::errors::AppError;
use crate::models::user::UserInfo;
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Loads the committed document and opens a session on it.
async fn open_session(state: &AppState, username: String) -> Result<(String, UserInfo), AppError> {
    let credentials = state.credentials.clone();
    let (doc, user) = state
        .blocking(move || {
            let doc = credentials.get_document(&username)?;
            let user = credentials.get_public_info(&username)?;
            Ok((doc, user))
        })
        .await?;
    let token = state.sessions.open(&user.username, doc);
    Ok((token, user))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if [&req.username, &req.email, &req.password, &req.confirm_password]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(AppError::Validation("Please fill all fields".to_string()));
    }
    if req.password != req.confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    let credentials = state.credentials.clone();
    let username = req.username.clone();
    state
        .blocking(move || Ok(credentials.register(&username, &req.password, &req.email)?))
        .await?;

    let (token, user) = open_session(&state, req.username).await?;
    info!("User {} registered", user.username);
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&token, state.sessions.ttl()))],
        Json(user),
    ))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let credentials = state.credentials.clone();
    let username = req.username.clone();
    let outcome = state
        .blocking(move || Ok(credentials.authenticate(&username, &req.password)))
        .await?;

    match outcome {
        Ok(()) => {}
        Err(e @ (StoreError::NotFound | StoreError::WrongPassword)) => {
            debug!("Login rejected for {}: {e}", req.username);
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    }

    let (token, user) = open_session(&state, req.username).await?;
    info!("User {} logged in", user.username);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&token, state.sessions.ttl()))],
        Json(user),
    ))
}

/// POST /api/v1/auth/logout
///
/// Always succeeds; an unsaved draft is discarded with the session.
pub async fn handle_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = token_from_headers(&headers) {
        if !state.sessions.close(token) {
            debug!("Logout with unknown or expired session");
        }
    }
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    )
}

/// GET /api/v1/me
pub async fn handle_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<UserInfo>, AppError> {
    let credentials = state.credentials.clone();
    let user = state
        .blocking(move || Ok(credentials.get_public_info(&ctx.username)?))
        .await?;
    Ok(Json(user))
}
