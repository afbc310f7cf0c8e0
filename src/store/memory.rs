use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::{
    auth::repo_types::{AuthToken, User},
    contacts::repo_types::Contact,
    id::RecordId,
};

#[derive(Default)]
struct Collections {
    users: HashMap<RecordId, User>,
    tokens: HashMap<String, AuthToken>,
    // insertion order doubles as listing order
    contacts: Vec<Contact>,
}

/// In-process store used for local runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a user row while leaving its tokens and contacts behind.
    #[cfg(test)]
    pub async fn remove_user(&self, id: RecordId) {
        self.inner.write().await.users.remove(&id);
    }
}

impl Collections {
    fn require_owner(&self, user_id: RecordId) -> Result<(), StoreError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::MissingOwner(user_id))
        }
    }
}

fn owned_by(contact: &Contact, user_id: RecordId, id: RecordId) -> bool {
    contact.id == id && contact.user_id == user_id
}

fn matches_pattern(contact: &Contact, pattern: &Regex) -> bool {
    [&contact.first, &contact.last, &contact.twitter]
        .iter()
        .any(|field| pattern.is_match(field))
}

#[async_trait]
impl Store for MemoryStore {
    async fn setup(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut db = self.inner.write().await;
        if db.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        db.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: RecordId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let db = self.inner.read().await;
        Ok(db.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_token(&self, token: &AuthToken) -> Result<(), StoreError> {
        let mut db = self.inner.write().await;
        db.require_owner(token.user_id)?;
        if db.tokens.contains_key(&token.token) {
            return Err(StoreError::Duplicate("token"));
        }
        db.tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_live_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<AuthToken>, StoreError> {
        let db = self.inner.read().await;
        Ok(db.tokens.get(token).filter(|t| t.is_live_at(now)).cloned())
    }

    async fn delete_token(&self, token: &str) -> Result<u64, StoreError> {
        let removed = self.inner.write().await.tokens.remove(token);
        Ok(u64::from(removed.is_some()))
    }

    async fn list_contacts(&self, user_id: RecordId) -> Result<Vec<Contact>, StoreError> {
        let db = self.inner.read().await;
        Ok(db
            .contacts
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn search_contacts(
        &self,
        user_id: RecordId,
        pattern: &Regex,
    ) -> Result<Vec<Contact>, StoreError> {
        let db = self.inner.read().await;
        Ok(db
            .contacts
            .iter()
            .filter(|c| c.user_id == user_id && matches_pattern(c, pattern))
            .cloned()
            .collect())
    }

    async fn find_contact(
        &self,
        user_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, StoreError> {
        let db = self.inner.read().await;
        Ok(db
            .contacts
            .iter()
            .find(|c| owned_by(c, user_id, id))
            .cloned())
    }

    async fn insert_contact(&self, contact: &Contact) -> Result<(), StoreError> {
        let mut db = self.inner.write().await;
        db.require_owner(contact.user_id)?;
        db.contacts.push(contact.clone());
        Ok(())
    }

    async fn replace_contact(&self, contact: &Contact) -> Result<u64, StoreError> {
        let mut db = self.inner.write().await;
        match db
            .contacts
            .iter_mut()
            .find(|c| owned_by(c, contact.user_id, contact.id))
        {
            Some(existing) => {
                *existing = contact.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn toggle_favorite(
        &self,
        user_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, StoreError> {
        let mut db = self.inner.write().await;
        Ok(db
            .contacts
            .iter_mut()
            .find(|c| owned_by(c, user_id, id))
            .map(|c| {
                c.favorite = !c.favorite;
                c.clone()
            }))
    }

    async fn delete_contact(&self, user_id: RecordId, id: RecordId) -> Result<u64, StoreError> {
        let mut db = self.inner.write().await;
        let before = db.contacts.len();
        db.contacts.retain(|c| !owned_by(c, user_id, id));
        Ok((before - db.contacts.len()) as u64)
    }
}
