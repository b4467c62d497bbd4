use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{token_from_headers, SessionContext};
use crate::errors::AppError;
use crate::state::AppState;

/// Resolves the session cookie to a live session and inserts a
/// `SessionContext` into request extensions. Missing, unknown or expired
/// sessions get a 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(req.headers())
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let username = state
        .sessions
        .with_session(&token, |session| session.username.clone())
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut()
        .insert(SessionContext { token, username });
    Ok(next.run(req).await)
}
