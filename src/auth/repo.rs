use time::OffsetDateTime;

use crate::{
    auth::repo_types::User,
    id::RecordId,
    store::{Store, StoreError},
};

impl User {
    /// Find a user by (already normalized) email.
    pub async fn find_by_email(store: &dyn Store, email: &str) -> Result<Option<User>, StoreError> {
        store.find_user_by_email(email).await
    }

    /// Create a new user with hashed password.
    ///
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    pub async fn create(
        store: &dyn Store,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let user = User {
            id: RecordId::new(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        store.insert_user(&user).await?;
        Ok(user)
    }
}
