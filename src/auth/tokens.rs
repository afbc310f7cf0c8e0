use std::sync::Arc;

use axum::extract::FromRef;
use rand::{rngs::OsRng, RngCore};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::repo_types::{AuthToken, User},
    id::RecordId,
    state::AppState,
    store::{Store, StoreError},
};

const TOKEN_BYTES: usize = 32;

/// Issues, resolves and revokes opaque bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn Store>,
    ttl: Duration,
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.store.clone(),
            Duration::days(state.config.token.ttl_days),
        )
    }
}

/// 32 random bytes from the OS CSPRNG, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl TokenService {
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn issue(&self, user_id: RecordId) -> Result<AuthToken, StoreError> {
        self.issue_at(user_id, OffsetDateTime::now_utc()).await
    }

    async fn issue_at(
        &self,
        user_id: RecordId,
        now: OffsetDateTime,
    ) -> Result<AuthToken, StoreError> {
        let token = AuthToken {
            id: RecordId::new(),
            token: generate_token(),
            user_id,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.store.insert_token(&token).await?;
        debug!(user_id = %user_id, expires_at = %token.expires_at, "token issued");
        Ok(token)
    }

    /// Owner of a live token. Unknown, expired and orphaned tokens all come
    /// back as `None`.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>, StoreError> {
        let now = OffsetDateTime::now_utc();
        let Some(found) = self.store.find_live_token(token, now).await? else {
            return Ok(None);
        };
        let user = self.store.find_user(found.user_id).await?;
        if user.is_none() {
            debug!(user_id = %found.user_id, "token owner no longer exists");
        }
        Ok(user)
    }

    /// `true` if a token was deleted.
    pub async fn revoke(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.store.delete_token(token).await? > 0)
    }
}
