use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::auth::repo::ROLE_ADMIN;
use crate::state::AppState;

pub async fn run_migrations(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")
}

pub async fn seed_defaults(state: &AppState) -> anyhow::Result<()> {
    seed_admin(state).await
}

async fn seed_admin(state: &AppState) -> anyhow::Result<()> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE role = $1 LIMIT 1")
        .bind(ROLE_ADMIN)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let username = &state.config.admin_username;
    let password = &state.config.admin_password;
    if password == "1234" {
        warn!("ADMIN_PASSWORD not set, seeding admin with the default password; set ADMIN_PASSWORD in production");
    }

    let password_hash = hash_password(password)?;
    sqlx::query(
        r#"
        INSERT INTO users (username, first_name, last_name, email, phone, password_hash, role)
        VALUES ($1, 'Administrador', 'Sistema', 'admin@urbanbarber.com', '3009876543', $2, $3)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(ROLE_ADMIN)
    .execute(&state.db)
    .await?;

    info!(username = %username, "seeded admin user");
    Ok(())
}
