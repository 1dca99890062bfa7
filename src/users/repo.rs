use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One row per email. Created at first login, updated in place afterwards,
/// never deleted. Serializes with the wire names the frontend expects
/// (vehicleNumber, statusKey, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub provider: String,
    pub avatar: Option<String>,
    pub vehicle_number: Option<String>,
    pub phone_number: Option<String>,
    pub status_key: String,
    pub status_message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub login_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl UserProfile {
    /// Find a profile by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, email, name, provider, avatar, vehicle_number, phone_number,
                   status_key, status_message, login_time, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a fresh profile. status_key falls back to the table default
    /// ('available'); login_time is stamped by the database.
    pub async fn create(
        db: &PgPool,
        email: &str,
        name: &str,
        provider: &str,
        avatar: Option<&str>,
    ) -> anyhow::Result<UserProfile> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO users (id, email, name, provider, avatar, login_time)
            VALUES ($1, $2, $3, $4, $5, now())
            RETURNING id, email, name, provider, avatar, vehicle_number, phone_number,
                      status_key, status_message, login_time, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(provider)
        .bind(avatar)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Repeat login: refresh name/avatar/login_time, leave everything else
    /// (vehicle, phone, status) untouched. A missing name keeps the stored one.
    pub async fn refresh_login(
        db: &PgPool,
        email: &str,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> anyhow::Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name), avatar = $3, login_time = now()
            WHERE email = $1
            RETURNING id, email, name, provider, avatar, vehicle_number, phone_number,
                      status_key, status_message, login_time, created_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(avatar)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Overwrite vehicle_number; None clears it. Returns None when no row
    /// exists for the email.
    pub async fn set_vehicle_number(
        db: &PgPool,
        email: &str,
        vehicle_number: Option<&str>,
    ) -> anyhow::Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users
            SET vehicle_number = $2
            WHERE email = $1
            RETURNING id, email, name, provider, avatar, vehicle_number, phone_number,
                      status_key, status_message, login_time, created_at
            "#,
        )
        .bind(email)
        .bind(vehicle_number)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Overwrite phone_number; None clears it.
    pub async fn set_phone_number(
        db: &PgPool,
        email: &str,
        phone_number: Option<&str>,
    ) -> anyhow::Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users
            SET phone_number = $2
            WHERE email = $1
            RETURNING id, email, name, provider, avatar, vehicle_number, phone_number,
                      status_key, status_message, login_time, created_at
            "#,
        )
        .bind(email)
        .bind(phone_number)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Write the already-merged status pair in one statement.
    pub async fn set_status(
        db: &PgPool,
        email: &str,
        status_key: &str,
        status_message: Option<&str>,
    ) -> anyhow::Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users
            SET status_key = $2, status_message = $3
            WHERE email = $1
            RETURNING id, email, name, provider, avatar, vehicle_number, phone_number,
                      status_key, status_message, login_time, created_at
            "#,
        )
        .bind(email)
        .bind(status_key)
        .bind(status_message)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
