//! Document store seam.
//!
//! Handlers only ever talk to [`Store`]. Every contact operation takes the
//! owning user id alongside the record id; a contact is never addressed by id
//! alone.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use time::OffsetDateTime;

use crate::{
    auth::repo_types::{AuthToken, User},
    contacts::repo_types::Contact,
    id::RecordId,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(&'static str),

    #[error("owning user {0} does not exist")]
    MissingOwner(RecordId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Create collections if they do not exist yet. Idempotent.
    async fn setup(&self) -> Result<(), StoreError>;
    /// Release pooled connections.
    async fn close(&self);
    async fn ping(&self) -> Result<(), StoreError>;

    // users
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user(&self, id: RecordId) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    // tokens
    /// Fails with [`StoreError::MissingOwner`] for an unknown `user_id`.
    async fn insert_token(&self, token: &AuthToken) -> Result<(), StoreError>;
    /// Token with this value that is still unexpired at `now`.
    async fn find_live_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<AuthToken>, StoreError>;
    /// Number of records removed.
    async fn delete_token(&self, token: &str) -> Result<u64, StoreError>;

    // contacts
    async fn list_contacts(&self, user_id: RecordId) -> Result<Vec<Contact>, StoreError>;
    /// Contacts whose first, last or twitter matches `pattern` anywhere.
    /// The pattern is compiled case-insensitive by the caller.
    async fn search_contacts(
        &self,
        user_id: RecordId,
        pattern: &Regex,
    ) -> Result<Vec<Contact>, StoreError>;
    async fn find_contact(
        &self,
        user_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, StoreError>;
    /// Fails with [`StoreError::MissingOwner`] for an unknown `user_id`.
    async fn insert_contact(&self, contact: &Contact) -> Result<(), StoreError>;
    /// Overwrite every mutable field of the contact matching
    /// `(contact.id, contact.user_id)`. Returns the number of records matched.
    async fn replace_contact(&self, contact: &Contact) -> Result<u64, StoreError>;
    /// Flip `favorite` in one step and return the updated record.
    async fn toggle_favorite(
        &self,
        user_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, StoreError>;
    async fn delete_contact(&self, user_id: RecordId, id: RecordId) -> Result<u64, StoreError>;
}
