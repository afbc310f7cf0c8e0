//! Request gate for every protected route.
//!
//! `Authorization` header present → token candidate → resolved to a user →
//! [`AuthUser`] inserted into the request. Any miss rejects with 401 before
//! the handler runs. Public routes are simply not wrapped by this layer.

use axum::{
    extract::{FromRef, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    auth::{repo_types::User, tokens::TokenService},
    error::AppError,
    state::AppState,
};

/// Authenticated caller, handed to handlers as `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// The bearer token this request was authenticated with.
    pub token: String,
}

/// The `Bearer ` prefix is optional.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned)
        .ok_or_else(|| AppError::unauthorized("Authorization token is missing"))?;

    let tokens = TokenService::from_ref(&state);
    let user = match tokens.resolve(&token).await? {
        Some(user) => user,
        None => {
            warn!(path = %request.uri().path(), "invalid or expired token");
            return Err(AppError::unauthorized("Invalid or expired token"));
        }
    };

    debug!(user_id = %user.id, "request authenticated");
    request.extensions_mut().insert(AuthUser { user, token });
    Ok(next.run(request).await)
}
