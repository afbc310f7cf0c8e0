use regex::Regex;
use tracing::debug;

use crate::{
    contacts::repo_types::Contact,
    id::RecordId,
    store::{Store, StoreError},
};

impl Contact {
    pub async fn list_by_user(store: &dyn Store, user_id: RecordId) -> Result<Vec<Contact>, StoreError> {
        store.list_contacts(user_id).await
    }

    pub async fn search(
        store: &dyn Store,
        user_id: RecordId,
        pattern: &Regex,
    ) -> Result<Vec<Contact>, StoreError> {
        store.search_contacts(user_id, pattern).await
    }

    pub async fn get(
        store: &dyn Store,
        user_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, StoreError> {
        store.find_contact(user_id, id).await
    }

    /// Persist a bound payload under a fresh id owned by `user_id`.
    pub async fn create(
        store: &dyn Store,
        user_id: RecordId,
        payload: Contact,
    ) -> Result<Contact, StoreError> {
        let contact = Contact {
            id: RecordId::new(),
            user_id,
            ..payload
        };
        store.insert_contact(&contact).await?;
        debug!(contact_id = %contact.id, "contact created");
        Ok(contact)
    }

    /// Full replace: every field comes from `payload`, so anything it left
    /// out is back at its default.
    pub async fn update(
        store: &dyn Store,
        user_id: RecordId,
        id: RecordId,
        payload: Contact,
    ) -> Result<Option<Contact>, StoreError> {
        let contact = Contact {
            id,
            user_id,
            ..payload
        };
        if store.replace_contact(&contact).await? == 0 {
            return Ok(None);
        }
        Ok(Some(contact))
    }

    pub async fn toggle_favorite(
        store: &dyn Store,
        user_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, StoreError> {
        store.toggle_favorite(user_id, id).await
    }

    /// `true` if a contact was removed.
    pub async fn delete(store: &dyn Store, user_id: RecordId, id: RecordId) -> Result<bool, StoreError> {
        Ok(store.delete_contact(user_id, id).await? > 0)
    }
}
