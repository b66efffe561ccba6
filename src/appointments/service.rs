use anyhow::Context;
use time::{Date, OffsetDateTime, Time};
use tracing::info;
use uuid::Uuid;

use crate::appointments::dto::CreateCitaRequest;
use crate::appointments::repo::{self, NewCita};
use crate::auth::jwt::AuthUser;
use crate::auth::password::hash_password;
use crate::auth::repo::{self as users, NewUser, User, ROLE_CLIENT};
use crate::catalog;
use crate::error::{is_unique_violation, ApiError};
use crate::state::AppState;

pub const OPEN_HOUR: u8 = 7;
pub const CLOSE_HOUR: u8 = 22;

const MAX_NOTES_CHARS: usize = 200;
const WALK_IN_LAST_NAME: &str = "Invitado";

/// Who the appointment will belong to, decided before any write happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingIdentity {
    Registered(i64),
    WalkIn {
        name: String,
        phone: String,
        email: Option<String>,
    },
}

/// Resolve the acting identity. A bearer token always wins; anonymous
/// callers must bring a usable walk-in bundle.
pub fn booking_identity(
    caller: Option<&AuthUser>,
    req: &CreateCitaRequest,
) -> Result<BookingIdentity, ApiError> {
    if let Some(caller) = caller {
        return Ok(BookingIdentity::Registered(caller.id));
    }

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let phone = req.phone.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() || phone.is_empty() {
        return Err(ApiError::bad_request(
            "name and phone are required for walk-in bookings",
        ));
    }

    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase());

    Ok(BookingIdentity::WalkIn {
        name: name.to_string(),
        phone: phone.to_string(),
        email,
    })
}

/// Slot checks shared by every booking path: no past dates, and the shop
/// operates 07:00-22:00.
pub fn validate_slot(date: Date, time: Time) -> Result<(), ApiError> {
    let today = OffsetDateTime::now_utc().date();
    if date < today {
        return Err(ApiError::bad_request("date in past"));
    }
    let hour = time.hour();
    if hour < OPEN_HOUR || hour >= CLOSE_HOUR {
        return Err(ApiError::bad_request("outside business hours"));
    }
    Ok(())
}

/// Create an appointment: validate the referenced catalog entities and the
/// slot, resolve the acting identity, then persist appointment + popularity
/// bump in one transaction.
pub async fn create_cita(
    state: &AppState,
    caller: Option<&AuthUser>,
    req: &CreateCitaRequest,
) -> Result<i64, ApiError> {
    let barber = catalog::repo::find_barber(&state.db, req.barber_id).await?;
    if !barber.map(|b| b.available).unwrap_or(false) {
        return Err(ApiError::bad_request("barber unavailable"));
    }

    let service = catalog::repo::find_service(&state.db, req.service_id).await?;
    if !service.map(|s| s.available).unwrap_or(false) {
        return Err(ApiError::bad_request("service unavailable"));
    }

    validate_slot(req.date, req.time)?;

    let notes = req.notes.as_deref().unwrap_or_default().trim().to_string();
    if notes.chars().count() > MAX_NOTES_CHARS {
        return Err(ApiError::bad_request("notes too long"));
    }

    let identity = booking_identity(caller, req)?;

    let mut tx = state.db.begin().await.context("begin booking")?;

    let owner_id = match identity {
        BookingIdentity::Registered(user_id) => {
            // The token subject must still exist; the FK would reject it anyway.
            users::find_by_id(&state.db, user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("user not found"))?;
            user_id
        }
        BookingIdentity::WalkIn { name, phone, email } => {
            match users::find_by_phone_or_email(&mut tx, &phone, email.as_deref()).await? {
                Some(existing) => {
                    info!(user_id = %existing.id, "walk-in matched an existing account");
                    existing.id
                }
                None => {
                    let user = create_walk_in_user(&mut tx, &name, &phone, email.as_deref()).await?;
                    info!(user_id = %user.id, "created walk-in user");
                    user.id
                }
            }
        }
    };

    let cita_id = repo::insert(
        &mut tx,
        &NewCita {
            user_id: owner_id,
            barber_id: req.barber_id,
            service_id: req.service_id,
            date: req.date,
            time: req.time,
            notes,
        },
    )
    .await?;
    repo::increment_popularity(&mut tx, req.service_id).await?;

    tx.commit().await.context("commit booking")?;

    info!(cita_id = %cita_id, user_id = %owner_id, "appointment created");
    Ok(cita_id)
}

/// Placeholder account for a walk-in: generated handle, sentinel last name,
/// and a throwaway password nobody can use interactively.
async fn create_walk_in_user(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    name: &str,
    phone: &str,
    email: Option<&str>,
) -> Result<User, ApiError> {
    let handle = format!("invitado_{}", Uuid::new_v4().simple());
    let password_hash = hash_password(&Uuid::new_v4().to_string())?;

    users::create_in_tx(
        tx,
        NewUser {
            username: &handle,
            first_name: name,
            last_name: WALK_IN_LAST_NAME,
            email,
            phone,
            password_hash: &password_hash,
            role: ROLE_CLIENT,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("phone or email already registered")
        } else {
            anyhow::Error::from(e).into()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::{ROLE_ADMIN, ROLE_CLIENT};
    use time::macros::time;
    use time::Duration;

    fn caller(id: i64, role: &str) -> AuthUser {
        AuthUser {
            id,
            username: "someone".into(),
            role: role.into(),
        }
    }

    fn request(name: Option<&str>, phone: Option<&str>, email: Option<&str>) -> CreateCitaRequest {
        let today = OffsetDateTime::now_utc().date();
        CreateCitaRequest {
            barber_id: 1,
            service_id: 1,
            date: today,
            time: time!(9:00),
            notes: None,
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
        }
    }

    #[test]
    fn authenticated_caller_books_as_themselves() {
        let req = request(Some("Juan"), Some("3001234567"), None);
        let identity = booking_identity(Some(&caller(5, ROLE_CLIENT)), &req).unwrap();
        assert_eq!(identity, BookingIdentity::Registered(5));
    }

    #[test]
    fn admin_token_also_short_circuits_to_registered() {
        let req = request(None, None, None);
        let identity = booking_identity(Some(&caller(1, ROLE_ADMIN)), &req).unwrap();
        assert_eq!(identity, BookingIdentity::Registered(1));
    }

    #[test]
    fn anonymous_without_name_or_phone_is_rejected() {
        for (name, phone) in [
            (None, None),
            (Some("Juan"), None),
            (None, Some("3001234567")),
            (Some("   "), Some("3001234567")),
            (Some("Juan"), Some("   ")),
        ] {
            let req = request(name, phone, None);
            assert!(matches!(
                booking_identity(None, &req),
                Err(ApiError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn walk_in_bundle_is_trimmed_and_email_normalized() {
        let req = request(Some("  Juan "), Some(" 3001234567 "), Some(" Juan@Example.COM "));
        let identity = booking_identity(None, &req).unwrap();
        assert_eq!(
            identity,
            BookingIdentity::WalkIn {
                name: "Juan".into(),
                phone: "3001234567".into(),
                email: Some("juan@example.com".into()),
            }
        );
    }

    #[test]
    fn empty_walk_in_email_becomes_none() {
        let req = request(Some("Juan"), Some("3001234567"), Some("   "));
        let identity = booking_identity(None, &req).unwrap();
        assert!(matches!(
            identity,
            BookingIdentity::WalkIn { email: None, .. }
        ));
    }

    #[test]
    fn past_dates_are_rejected() {
        let yesterday = OffsetDateTime::now_utc().date() - Duration::days(1);
        let err = validate_slot(yesterday, time!(9:00)).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(m) if m == "date in past"));
    }

    #[test]
    fn today_and_tomorrow_are_accepted() {
        let today = OffsetDateTime::now_utc().date();
        assert!(validate_slot(today, time!(9:00)).is_ok());
        assert!(validate_slot(today + Duration::days(1), time!(9:00)).is_ok());
    }

    #[test]
    fn business_hours_are_half_open() {
        let tomorrow = OffsetDateTime::now_utc().date() + Duration::days(1);
        assert!(validate_slot(tomorrow, time!(6:59)).is_err());
        assert!(validate_slot(tomorrow, time!(7:00)).is_ok());
        assert!(validate_slot(tomorrow, time!(21:59)).is_ok());
        assert!(validate_slot(tomorrow, time!(22:00)).is_err());
    }
}
