use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::id::RecordId;

/// User record in the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: RecordId,                 // unique user ID
    pub email: String,                // normalized (trimmed, lower-cased) email
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 PHC string, not exposed in JSON
    pub created_at: OffsetDateTime,   // creation timestamp
}

/// Issued bearer token. Owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthToken {
    pub id: RecordId,
    pub token: String,
    pub user_id: RecordId,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl AuthToken {
    pub fn is_live_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}
