//! Session token model and database operations
//!
//! Each issued bearer token has one row, keyed by the token's `jti` claim.
//! Revocation is a primary-key delete, and the set of a user's live tokens,
//! ordered by `seq`, is the user's token list.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE session_tokens (
//!     id UUID PRIMARY KEY,                 -- jti
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     token TEXT NOT NULL,
//!     seq BIGSERIAL NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A live session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionToken {
    /// Token ID (`jti` claim)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// The signed token as handed to the client
    pub token: String,

    /// Issue order across all sessions
    pub seq: i64,

    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    /// Records a newly issued token
    pub async fn create(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, SessionToken>(
            r#"
            INSERT INTO session_tokens (id, user_id, token)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token, seq, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(token)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// True if `id` is a live token of `user_id`
    pub async fn exists(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM session_tokens WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists a user's live tokens in issue order
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sessions = sqlx::query_as::<_, SessionToken>(
            r#"
            SELECT id, user_id, token, seq, created_at
            FROM session_tokens
            WHERE user_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    /// Revokes one token; false if it wasn't live
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM session_tokens WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every token of a user, returning how many were removed
    pub async fn delete_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM session_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
