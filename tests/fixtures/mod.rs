// Test fixtures - reusable test data
// Surgery records, stores and users shared by the integration tests

#![allow(dead_code)]

use bak_clinic::models::surgery::{SurgeryRecord, SurgeryStatus};
use bak_clinic::models::user::{Role, User};
use bak_clinic::scheduling::ScheduleStore;

pub const ROOM_1: &str = "Pabellón 1";
pub const ROOM_2: &str = "Pabellón 2";

/// Sample dates for testing
pub mod dates {
    use chrono::NaiveDate;

    /// Monday Mar 10, 2025; every scheduled fixture lands on this day
    pub fn surgery_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    /// UTC timestamp on [`surgery_day`] as the backend sends it
    pub fn at(time: &str) -> String {
        format!("2025-03-10T{}:00.000Z", time)
    }
}

/// Surgery records as they come back from the list endpoint
pub mod records {
    use super::*;

    /// Pending request with display fields filled in
    pub fn pending(id: &str, patient: &str, duration: u32) -> SurgeryRecord {
        SurgeryRecord {
            id: id.to_string(),
            patient_id: Some(format!("p-{}", id)),
            patient_name: Some(patient.to_string()),
            doctor_id: Some("7".to_string()),
            doctor_first_name: Some("Carla".to_string()),
            doctor_last_name: Some("Soto".to_string()),
            surgery_type: Some("Apendicectomía".to_string()),
            estimated_duration: Some(duration),
            status: Some(SurgeryStatus::Pending),
            ..SurgeryRecord::default()
        }
    }

    /// Booking on [`dates::surgery_day`] starting at `time` (`HH:MM`)
    pub fn scheduled(id: &str, room: &str, time: &str, duration: u32) -> SurgeryRecord {
        SurgeryRecord {
            operating_room: Some(room.to_string()),
            scheduled_date: Some(dates::at(time)),
            status: Some(SurgeryStatus::Scheduled),
            ..pending(id, "Rosa Díaz", duration)
        }
    }
}

/// Store loaded the way the scheduling page loads it
pub fn store_with(pending: &[SurgeryRecord], scheduled: &[SurgeryRecord]) -> ScheduleStore {
    let mut store = ScheduleStore::new();
    store.replace_pending(pending);
    store.replace_scheduled(scheduled);
    store
}

pub fn admin_user() -> User {
    User {
        id: "1".to_string(),
        email: "admin@bak.cl".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Rojas".to_string(),
        phone: None,
        role: Role::Admin,
        is_active: true,
        email_verified: true,
        last_login: None,
        created_at: None,
        updated_at: None,
    }
}
