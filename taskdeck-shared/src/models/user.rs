//! User model and database operations
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     email VARCHAR(320) NOT NULL,      -- stored trimmed + lowercase
//!     password_hash VARCHAR(255) NOT NULL,
//!     age INTEGER NOT NULL DEFAULT 0 CHECK (age >= 0),
//!     avatar BYTEA,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     CONSTRAINT users_email_key UNIQUE (email)
//! );
//! ```
//!
//! The avatar blob is never loaded into [`User`]; it is read and written
//! through the dedicated avatar queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Columns selected into a [`User`], avatar excluded
const USER_COLUMNS: &str = "id, name, email, password_hash, age, created_at, updated_at";

/// User account
///
/// Serializes without the password hash, so it can be returned directly in
/// API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name (trimmed)
    pub name: String,

    /// Email address (trimmed, lowercase, unique)
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Age in years, 0 when unknown
    pub age: i32,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// Fields are expected to be normalized already; see [`normalize_email`].
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub age: i32,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub age: Option<i32>,
}

impl UpdateUser {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.age.is_none()
    }
}

/// Trims and lowercases an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_email_key` if the email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, age) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.name)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.age)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by (already normalized) email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Updates the non-None fields of a user and bumps `updated_at`
    ///
    /// Returns None if the user doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.age.is_some() {
            bind_count += 1;
            query.push_str(&format!(", age = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(age) = data.age {
            q = q.bind(age);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user and returns the deleted row
    ///
    /// Tasks and session tokens go with it (ON DELETE CASCADE).
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("DELETE FROM users WHERE id = $1 RETURNING {}", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Replaces (or clears, with None) the stored avatar
    ///
    /// Returns false if the user doesn't exist.
    pub async fn set_avatar(
        pool: &PgPool,
        id: Uuid,
        avatar: Option<Vec<u8>>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(avatar)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads the stored avatar, None if the user or the avatar is absent
    pub async fn find_avatar(pool: &PgPool, id: Uuid) -> Result<Option<Vec<u8>>, sqlx::Error> {
        let avatar: Option<Option<Vec<u8>>> =
            sqlx::query_scalar("SELECT avatar FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(avatar.flatten())
    }
}
