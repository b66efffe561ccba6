use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, Time};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";

/// Appointment joined with its barber, service and owner snapshots. The
/// appointment holds the only copies of the three foreign keys; users,
/// barbers and services own nothing back.
#[derive(Debug, FromRow)]
pub struct CitaJoinRow {
    pub id: i64,
    pub date: Date,
    pub time: Time,
    pub status: String,
    pub paid: bool,
    pub notes: String,
    pub barber_id: i64,
    pub barber_name: String,
    pub barber_specialty: String,
    pub service_id: i64,
    pub service_name: String,
    pub service_price: f64,
    pub service_duration_min: i32,
    pub owner_id: i64,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub owner_phone: String,
}

pub struct NewCita {
    pub user_id: i64,
    pub barber_id: i64,
    pub service_id: i64,
    pub date: Date,
    pub time: Time,
    pub notes: String,
}

const JOINED_SELECT: &str = r#"
    SELECT c.id, c.date, c.time, c.status, c.paid, c.notes,
           b.id AS barber_id, b.name AS barber_name, b.specialty AS barber_specialty,
           s.id AS service_id, s.name AS service_name, s.price AS service_price,
           s.duration_min AS service_duration_min,
           u.id AS owner_id, u.first_name AS owner_first_name,
           u.last_name AS owner_last_name, u.phone AS owner_phone
    FROM appointments c
    JOIN barbers b ON b.id = c.barber_id
    JOIN services s ON s.id = c.service_id
    JOIN users u ON u.id = c.user_id
"#;

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<CitaJoinRow>> {
    let sql = format!("{JOINED_SELECT} ORDER BY c.date DESC");
    let rows = sqlx::query_as::<_, CitaJoinRow>(&sql).fetch_all(db).await?;
    Ok(rows)
}

pub async fn list_by_owner(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<CitaJoinRow>> {
    let sql = format!("{JOINED_SELECT} WHERE c.user_id = $1 ORDER BY c.date DESC");
    let rows = sqlx::query_as::<_, CitaJoinRow>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_joined(db: &PgPool, id: i64) -> anyhow::Result<Option<CitaJoinRow>> {
    let sql = format!("{JOINED_SELECT} WHERE c.id = $1");
    let row = sqlx::query_as::<_, CitaJoinRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Owning user of an appointment, for the access check ahead of
/// delete/pay operations.
pub async fn find_owner_id(db: &PgPool, id: i64) -> anyhow::Result<Option<i64>> {
    let owner = sqlx::query_scalar::<_, i64>("SELECT user_id FROM appointments WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(owner)
}

pub async fn insert(tx: &mut Transaction<'_, Postgres>, cita: &NewCita) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO appointments (user_id, barber_id, service_id, date, time, notes, status, paid)
        VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE)
        RETURNING id
        "#,
    )
    .bind(cita.user_id)
    .bind(cita.barber_id)
    .bind(cita.service_id)
    .bind(cita.date)
    .bind(cita.time)
    .bind(&cita.notes)
    .bind(STATUS_PENDING)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

/// Best-effort ranking signal, bumped once per successful booking.
pub async fn increment_popularity(
    tx: &mut Transaction<'_, Postgres>,
    service_id: i64,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE services SET popularity = popularity + 1 WHERE id = $1")
        .bind(service_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Payments cascade at the store; nothing else is touched.
pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM appointments WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Idempotent: repeating the update leaves the same paid/confirmed row.
pub async fn mark_paid(db: &PgPool, id: i64) -> anyhow::Result<()> {
    sqlx::query("UPDATE appointments SET paid = TRUE, status = $2 WHERE id = $1")
        .bind(id)
        .bind(STATUS_CONFIRMED)
        .execute(db)
        .await?;
    Ok(())
}
