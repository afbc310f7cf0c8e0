use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::info;

use super::{Store, StoreError};
use crate::{
    auth::repo_types::{AuthToken, User},
    contacts::repo_types::Contact,
    id::RecordId,
};

const SETUP: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS auth_tokens (
        id         UUID PRIMARY KEY,
        token      TEXT NOT NULL UNIQUE,
        user_id    UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL,
        expires_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        seq      BIGSERIAL,
        id       UUID PRIMARY KEY,
        user_id  UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        avatar   TEXT NOT NULL DEFAULT '',
        first    TEXT NOT NULL,
        last     TEXT NOT NULL,
        twitter  TEXT NOT NULL DEFAULT '',
        favorite BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS contacts_user_id_idx ON contacts (user_id)",
];

const CONTACT_COLUMNS: &str = "id, user_id, avatar, first, last, twitter, favorite";

/// Postgres-backed store over a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }
}

fn map_unique(e: sqlx::Error, field: &'static str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(field),
        _ => StoreError::Database(e),
    }
}

fn map_owned_insert(e: sqlx::Error, field: &'static str, owner: RecordId) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::MissingOwner(owner)
        }
        _ => map_unique(e, field),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn setup(&self) -> Result<(), StoreError> {
        for statement in SETUP {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("postgres store ready");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "email"))?;
        Ok(())
    }

    async fn find_user(&self, id: RecordId) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_token(&self, token: &AuthToken) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (id, token, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_owned_insert(e, "token", token.user_id))?;
        Ok(())
    }

    async fn find_live_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<AuthToken>, StoreError> {
        let found = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT id, token, user_id, created_at, expires_at
            FROM auth_tokens
            WHERE token = $1 AND expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    async fn delete_token(&self, token: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_contacts(&self, user_id: RecordId) -> Result<Vec<Contact>, StoreError> {
        let rows = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = $1 ORDER BY seq"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search_contacts(
        &self,
        user_id: RecordId,
        pattern: &Regex,
    ) -> Result<Vec<Contact>, StoreError> {
        let rows = sqlx::query_as::<_, Contact>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE user_id = $1
              AND (first ~* $2 OR last ~* $2 OR twitter ~* $2)
            ORDER BY seq
            "#
        ))
        .bind(user_id)
        .bind(pattern.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_contact(
        &self,
        user_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, StoreError> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_contact(&self, contact: &Contact) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO contacts (id, user_id, avatar, first, last, twitter, favorite)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(contact.id)
        .bind(contact.user_id)
        .bind(&contact.avatar)
        .bind(&contact.first)
        .bind(&contact.last)
        .bind(&contact.twitter)
        .bind(contact.favorite)
        .execute(&self.pool)
        .await
        .map_err(|e| map_owned_insert(e, "id", contact.user_id))?;
        Ok(())
    }

    async fn replace_contact(&self, contact: &Contact) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE contacts
               SET avatar = $3, first = $4, last = $5, twitter = $6, favorite = $7
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(contact.id)
        .bind(contact.user_id)
        .bind(&contact.avatar)
        .bind(&contact.first)
        .bind(&contact.last)
        .bind(&contact.twitter)
        .bind(contact.favorite)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn toggle_favorite(
        &self,
        user_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, StoreError> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            r#"
            UPDATE contacts
               SET favorite = NOT favorite
             WHERE id = $1 AND user_id = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_contact(&self, user_id: RecordId, id: RecordId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
