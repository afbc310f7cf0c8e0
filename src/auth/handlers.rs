use axum::{
    body::Bytes,
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser, RegisterRequest, SignInRequest},
        gate::AuthUser,
        password::{hash_password, verify_password},
        repo_types::User,
        tokens::TokenService,
    },
    binder,
    error::{AppError, AppResult},
    state::AppState,
    store::StoreError,
};

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/signin", post(sign_in))
}

/// Routes behind the auth gate.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signout", post(sign_out))
        .route("/auth/me", get(get_me))
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let payload: RegisterRequest = binder::bind(&body).map_err(AppError::Validation)?;

    // Ensure email is not taken
    if User::find_by_email(state.store.as_ref(), &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(state.store.as_ref(), &payload.email, &hash).await {
        Ok(user) => user,
        // lost a race against a concurrent registration
        Err(StoreError::Duplicate(_)) => {
            return Err(AppError::Conflict("Email already registered".into()))
        }
        Err(e) => return Err(AppError::internal("Failed to create user", e)),
    };

    let token = TokenService::from_ref(&state)
        .issue(user.id)
        .await
        .map_err(|e| AppError::internal("Failed to create auth token", e))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: token.token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn sign_in(State(state): State<AppState>, body: Bytes) -> AppResult<Json<AuthResponse>> {
    let payload: SignInRequest = binder::bind(&body).map_err(AppError::Validation)?;

    let Some(user) = User::find_by_email(state.store.as_ref(), &payload.email).await? else {
        warn!(email = %payload.email, "sign-in unknown email");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "sign-in invalid password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = TokenService::from_ref(&state)
        .issue(user.id)
        .await
        .map_err(|e| AppError::internal("Failed to create auth token", e))?;

    info!(user_id = %user.id, "user signed in");
    Ok(Json(AuthResponse {
        token: token.token,
        user: user.into(),
    }))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<StatusCode> {
    let revoked = TokenService::from_ref(&state)
        .revoke(&auth.token)
        .await
        .map_err(|e| AppError::internal("Failed to sign out", e))?;

    if !revoked {
        return Err(AppError::not_found("Token not found"));
    }

    info!("user signed out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn get_me(Extension(auth): Extension<AuthUser>) -> Json<PublicUser> {
    Json(auth.user.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn signed_in(state: &AppState) -> AuthUser {
        let user = User::create(state.store.as_ref(), "jane@example.com", "hash")
            .await
            .unwrap();
        let token = TokenService::from_ref(state).issue(user.id).await.unwrap();
        AuthUser {
            user,
            token: token.token,
        }
    }

    #[tokio::test]
    async fn sign_out_deletes_the_session_token() {
        let state = AppState::fake();
        let auth = signed_in(&state).await;

        let status = sign_out(State(state.clone()), Extension(auth.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(TokenService::from_ref(&state)
            .resolve(&auth.token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn sign_out_of_an_already_revoked_token_is_not_found() {
        let state = AppState::fake();
        let auth = signed_in(&state).await;

        // revoked after the gate let the request through
        assert!(TokenService::from_ref(&state)
            .revoke(&auth.token)
            .await
            .unwrap());

        let err = sign_out(State(state), Extension(auth)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Token not found"));
    }
}
