use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// Barber record. Read-only from the API's perspective.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Barber {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub image: String,
    pub experience: String,
    pub rating: f64,
    pub available: bool,
    pub appointments_served: i32,
}

/// Service offering. `popularity` counts successful bookings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub duration_min: i32,
    pub price: f64,
    pub available: bool,
    pub popularity: i32,
}

pub async fn list_available_barbers(db: &PgPool) -> anyhow::Result<Vec<Barber>> {
    let rows = sqlx::query_as::<_, Barber>(
        r#"
        SELECT id, name, specialty, image, experience, rating, available, appointments_served
        FROM barbers
        WHERE available
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Fetch by id regardless of availability; detail pages show unavailable rows.
pub async fn find_barber(db: &PgPool, id: i64) -> anyhow::Result<Option<Barber>> {
    let barber = sqlx::query_as::<_, Barber>(
        r#"
        SELECT id, name, specialty, image, experience, rating, available, appointments_served
        FROM barbers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(barber)
}

pub async fn list_available_services(db: &PgPool) -> anyhow::Result<Vec<Service>> {
    let rows = sqlx::query_as::<_, Service>(
        r#"
        SELECT id, name, description, duration_min, price, available, popularity
        FROM services
        WHERE available
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_service(db: &PgPool, id: i64) -> anyhow::Result<Option<Service>> {
    let service = sqlx::query_as::<_, Service>(
        r#"
        SELECT id, name, description, duration_min, price, available, popularity
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(service)
}
