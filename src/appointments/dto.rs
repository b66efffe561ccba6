use serde::{Deserialize, Serialize};
use time::{Date, Time};

use crate::appointments::repo::CitaJoinRow;

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");
time::serde::format_description!(time_format, Time, "[hour]:[minute]");

/// Request body for booking an appointment. Authenticated callers book as
/// themselves; walk-ins supply `name` and `phone` (and optionally `email`)
/// instead.
#[derive(Debug, Deserialize)]
pub struct CreateCitaRequest {
    pub barber_id: i64,
    pub service_id: i64,
    #[serde(with = "date_format")]
    pub date: Date,
    #[serde(with = "time_format")]
    pub time: Time,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CitaCreated {
    pub message: String,
    pub cita_id: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BarberSnapshot {
    pub id: i64,
    pub name: String,
    pub specialty: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceSnapshot {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub duration_min: i32,
}

#[derive(Debug, Serialize)]
pub struct OwnerSnapshot {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Appointment with its joined snapshots. The owner block appears in list
/// responses only; the detail endpoint omits it.
#[derive(Debug, Serialize)]
pub struct CitaDetails {
    pub id: i64,
    #[serde(with = "date_format")]
    pub date: Date,
    #[serde(with = "time_format")]
    pub time: Time,
    pub status: String,
    pub paid: bool,
    pub notes: String,
    pub barber: BarberSnapshot,
    pub service: ServiceSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSnapshot>,
}

impl CitaDetails {
    pub fn from_row(row: CitaJoinRow, include_owner: bool) -> Self {
        Self {
            id: row.id,
            date: row.date,
            time: row.time,
            status: row.status,
            paid: row.paid,
            notes: row.notes,
            barber: BarberSnapshot {
                id: row.barber_id,
                name: row.barber_name,
                specialty: row.barber_specialty,
            },
            service: ServiceSnapshot {
                id: row.service_id,
                name: row.service_name,
                price: row.service_price,
                duration_min: row.service_duration_min,
            },
            owner: include_owner.then_some(OwnerSnapshot {
                id: row.owner_id,
                first_name: row.owner_first_name,
                last_name: row.owner_last_name,
                phone: row.owner_phone,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn create_request_parses_wire_formats() {
        let req: CreateCitaRequest = serde_json::from_str(
            r#"{
                "barber_id": 1,
                "service_id": 1,
                "date": "2030-05-10",
                "time": "09:00",
                "name": "Juan",
                "phone": "3001234567"
            }"#,
        )
        .unwrap();
        assert_eq!(req.barber_id, 1);
        assert_eq!(req.date, date!(2030 - 05 - 10));
        assert_eq!(req.time, time!(9:00));
        assert_eq!(req.name.as_deref(), Some("Juan"));
        assert!(req.email.is_none());
        assert!(req.notes.is_none());
    }

    #[test]
    fn create_request_rejects_bad_date() {
        let res = serde_json::from_str::<CreateCitaRequest>(
            r#"{"barber_id": 1, "service_id": 1, "date": "10/05/2030", "time": "09:00"}"#,
        );
        assert!(res.is_err());
    }

    fn sample_row() -> CitaJoinRow {
        CitaJoinRow {
            id: 5,
            date: date!(2030 - 05 - 10),
            time: time!(9:00),
            status: "pending".into(),
            paid: false,
            notes: "".into(),
            barber_id: 1,
            barber_name: "Ricardo".into(),
            barber_specialty: "Cortes Tradicionales".into(),
            service_id: 1,
            service_name: "Corte Sencillo".into(),
            service_price: 25000.0,
            service_duration_min: 45,
            owner_id: 2,
            owner_first_name: "Juan".into(),
            owner_last_name: "Pérez".into(),
            owner_phone: "3001234567".into(),
        }
    }

    #[test]
    fn details_serialize_wire_formats_and_owner() {
        let details = CitaDetails::from_row(sample_row(), true);
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["date"], "2030-05-10");
        assert_eq!(json["time"], "09:00");
        assert_eq!(json["owner"]["first_name"], "Juan");
        assert_eq!(json["service"]["duration_min"], 45);
    }

    #[test]
    fn detail_shape_omits_owner() {
        let details = CitaDetails::from_row(sample_row(), false);
        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("owner").is_none());
        assert_eq!(json["barber"]["name"], "Ricardo");
    }
}
