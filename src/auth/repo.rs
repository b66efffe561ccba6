use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_ADMIN: &str = "admin";

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: Option<&'a str>,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, first_name, last_name, email, phone, password_hash, role, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Look up a user by handle, email or phone, first match wins.
pub async fn find_by_identifier(db: &PgPool, identifier: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, first_name, last_name, email, phone, password_hash, role, created_at
        FROM users
        WHERE username = $1 OR email = $1 OR phone = $1
        LIMIT 1
        "#,
    )
    .bind(identifier)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn username_exists(db: &PgPool, username: &str) -> anyhow::Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(db)
            .await?;
    Ok(exists)
}

pub async fn email_exists(db: &PgPool, email: &str) -> anyhow::Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(db)
            .await?;
    Ok(exists)
}

pub async fn phone_exists(db: &PgPool, phone: &str) -> anyhow::Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
            .bind(phone)
            .fetch_one(db)
            .await?;
    Ok(exists)
}

/// Create a user. Returns the raw sqlx error so callers can tell a
/// unique-constraint race apart from other failures.
pub async fn create(db: &PgPool, user: NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, first_name, last_name, email, phone, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, username, first_name, last_name, email, phone, password_hash, role, created_at
        "#,
    )
    .bind(user.username)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.email)
    .bind(user.phone)
    .bind(user.password_hash)
    .bind(user.role)
    .fetch_one(db)
    .await
}

pub async fn create_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user: NewUser<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, first_name, last_name, email, phone, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, username, first_name, last_name, email, phone, password_hash, role, created_at
        "#,
    )
    .bind(user.username)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.email)
    .bind(user.phone)
    .bind(user.password_hash)
    .bind(user.role)
    .fetch_one(&mut **tx)
    .await
}

/// Walk-in reconciliation lookup: an existing account with the same phone
/// (or email, when supplied) owns the booking instead of a new placeholder.
pub async fn find_by_phone_or_email(
    tx: &mut Transaction<'_, Postgres>,
    phone: &str,
    email: Option<&str>,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, first_name, last_name, email, phone, password_hash, role, created_at
        FROM users
        WHERE phone = $1 OR ($2::text IS NOT NULL AND email = $2)
        LIMIT 1
        "#,
    )
    .bind(phone)
    .bind(email)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(user)
}
