/// User model and database operations
///
/// Users are identified primarily by email. The webhook path can also resolve
/// a user in reverse through a linked phone number, which is stored and
/// matched digits-only. Users are created implicitly on first sight of an
/// unseen email and are never deleted by this system.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     name TEXT,
///     phone TEXT UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::user::User;
/// use taskpad_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let (user, created) = User::get_or_create(
///     &pool,
///     "User@Example.com",
///     Some("Jane"),
///     Some("+1 (555) 123-4567"),
/// ).await?;
///
/// assert_eq!(user.email, "user@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Strips every non-digit character from a phone number
///
/// No canonical format (E.164 or otherwise) is enforced; the store and all
/// lookups use the digits-only form.
///
/// # Example
///
/// ```
/// use taskpad_shared::models::user::normalize_phone;
///
/// assert_eq!(normalize_phone("+1 (555) 123-4567"), "15551234567");
/// ```
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, stored lowercase
    ///
    /// Must be unique across all users; primary lookup key
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// Optional phone number, stored digits-only
    ///
    /// Unique when present; used for reverse lookup from the webhook path
    pub phone: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (lowercased before insert)
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// Optional phone number (normalized to digits before insert)
    pub phone: Option<String>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// The email is lowercased and the phone, if given, is reduced to its
    /// digits before insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the email or phone collides with an existing row
    /// (unique constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, phone)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, phone, created_at
            "#,
        )
        .bind(data.email.to_lowercase())
        .bind(data.name)
        .bind(
            data.phone
                .as_deref()
                .map(normalize_phone)
                .filter(|p| !p.is_empty()),
        )
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, phone, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, phone, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by phone number
    ///
    /// The input is normalized to digits before matching, so any formatting
    /// an upstream messaging channel applies is irrelevant. An input with no
    /// digits at all matches nobody.
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Self>, sqlx::Error> {
        let digits = normalize_phone(phone);
        if digits.is_empty() {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, phone, created_at
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(digits)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Looks up a user by email, creating the account on first sight
    ///
    /// Returns the user and whether a new row was created. Name and phone
    /// are only applied when the user is created; an existing row is
    /// returned untouched.
    pub async fn get_or_create(
        pool: &PgPool,
        email: &str,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(Self, bool), sqlx::Error> {
        if let Some(existing) = Self::find_by_email(pool, email).await? {
            return Ok((existing, false));
        }

        let user = Self::create(
            pool,
            CreateUser {
                email: email.to_string(),
                name: name.map(str::to_string),
                phone: phone.map(str::to_string),
            },
        )
        .await?;

        Ok((user, true))
    }

    /// Updates a user's phone number
    ///
    /// This is the explicit "link a phone number" action; the webhook path
    /// depends on it for phone-based resolution.
    ///
    /// # Returns
    ///
    /// The updated user, or None if no user matches the ID
    pub async fn update_phone(
        pool: &PgPool,
        id: Uuid,
        phone: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET phone = $2
            WHERE id = $1
            RETURNING id, email, name, phone, created_at
            "#,
        )
        .bind(id)
        .bind(normalize_phone(phone))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_strips_formatting() {
        assert_eq!(normalize_phone("+1 (555) 123-4567"), "15551234567");
    }

    #[test]
    fn test_normalize_phone_plain_digits_unchanged() {
        assert_eq!(normalize_phone("15551234567"), "15551234567");
    }

    #[test]
    fn test_normalize_phone_no_digits() {
        assert_eq!(normalize_phone("call me"), "");
    }

    #[test]
    fn test_normalize_phone_international_noise() {
        assert_eq!(normalize_phone("+44 20 7946 0958"), "442079460958");
    }
}
