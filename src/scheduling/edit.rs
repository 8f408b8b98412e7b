//! Edit-in-place and create forms for surgeries.
//!
//! Durations are entered as whole hours plus a quarter-hour remainder and must
//! add up to at least one hour. Stored durations that do not fit the picker are
//! rounded to the nearest quarter hour when a form opens. Validation happens
//! here, before any request.

use chrono::NaiveDate;

use super::change::ScheduleChange;
use super::conflict::TimeSpan;
use super::geometry::time_to_minutes;
use super::store::{derive_display_time, scheduled_start, ScheduleStore};
use super::ScheduleError;
use crate::models::surgery::{
    CreatePendingSurgeryRequest, PendingSurgery, Priority, ScheduledSurgery,
};
use crate::utils::date::{format_iso_utc, utc_timestamp};

pub const MIN_DURATION_MINUTES: u32 = 60;

/// Longest duration the picker can express (8h 45m)
pub const MAX_DURATION_MINUTES: u32 = 8 * 60 + 45;

/// Hour choices offered by the duration picker
pub const HOUR_OPTIONS: [u32; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

/// Minute choices offered by the duration picker
pub const MINUTE_OPTIONS: [u32; 4] = [0, 15, 30, 45];

const QUARTER_HOUR: u32 = 15;

/// Split a duration into (hours, minutes) the picker can show.
///
/// Rounds to the nearest quarter hour and clamps into the picker range, so the
/// result always comes from `HOUR_OPTIONS` and `MINUTE_OPTIONS`.
pub fn split_duration(total_minutes: u32) -> (u32, u32) {
    let rounded = (total_minutes.saturating_add(QUARTER_HOUR / 2) / QUARTER_HOUR) * QUARTER_HOUR;
    let clamped = rounded.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES);
    (clamped / 60, clamped % 60)
}

fn checked_duration(hours: u32, minutes: u32) -> Result<u32, ScheduleError> {
    if !MINUTE_OPTIONS.contains(&minutes) {
        return Err(ScheduleError::Validation(format!(
            "Minutos inválidos: {} (use 0, 15, 30 o 45)",
            minutes
        )));
    }

    let total = hours.saturating_mul(60).saturating_add(minutes);
    if total < MIN_DURATION_MINUTES {
        return Err(ScheduleError::DurationTooShort { minutes: total });
    }
    if !HOUR_OPTIONS.contains(&hours) {
        return Err(ScheduleError::Validation(format!(
            "Horas inválidas: {} (máximo {})",
            hours,
            HOUR_OPTIONS[HOUR_OPTIONS.len() - 1]
        )));
    }
    Ok(total)
}

fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Placement part of the edit form, only present for scheduled surgeries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementFields {
    pub operating_room: String,
    pub date: Option<NaiveDate>,
    /// `HH:MM`
    pub time: String,
}

/// Working copy of a surgery while the detail panel is in edit mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub id: String,
    pub surgery_type: String,
    pub hours: u32,
    pub minutes: u32,
    pub priority: Priority,
    pub pre_surgery_notes: String,
    pub anesthesia_type: String,
    pub placement: Option<PlacementFields>,
}

impl EditBuffer {
    pub fn for_pending(surgery: &PendingSurgery) -> Self {
        let (hours, minutes) = split_duration(surgery.duration_minutes());
        Self {
            id: surgery.id.clone(),
            surgery_type: surgery.surgery_type.clone(),
            hours,
            minutes,
            priority: surgery.priority,
            pre_surgery_notes: surgery.pre_surgery_notes.clone().unwrap_or_default(),
            anesthesia_type: surgery.anesthesia_type.clone().unwrap_or_default(),
            placement: None,
        }
    }

    pub fn for_scheduled(surgery: &ScheduledSurgery) -> Self {
        let mut buffer = Self::for_pending(&surgery.surgery);
        let start = scheduled_start(surgery.scheduled_date.as_deref());
        buffer.placement = Some(PlacementFields {
            operating_room: surgery.operating_room.clone(),
            date: start.map(|(date, _)| date),
            time: if start.is_some() {
                derive_display_time(surgery.scheduled_date.as_deref())
            } else {
                String::new()
            },
        });
        buffer
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }

    fn apply_to(&self, surgery: &PendingSurgery, total: u32) -> PendingSurgery {
        PendingSurgery {
            surgery_type: optional_text(&self.surgery_type)
                .unwrap_or_else(|| surgery.surgery_type.clone()),
            estimated_duration: total,
            priority: self.priority,
            pre_surgery_notes: optional_text(&self.pre_surgery_notes),
            anesthesia_type: optional_text(&self.anesthesia_type),
            ..surgery.clone()
        }
    }

    /// Validate the form and turn it into a change against the current store
    pub fn to_change(&self, store: &ScheduleStore) -> Result<ScheduleChange, ScheduleError> {
        let total = checked_duration(self.hours, self.minutes)?;

        if let Some(before) = store.find_pending(&self.id) {
            return Ok(ScheduleChange::EditPending {
                before: before.clone(),
                after: self.apply_to(before, total),
            });
        }

        let before = store
            .find_scheduled(&self.id)
            .ok_or_else(|| ScheduleError::Validation("La cirugía ya no existe".to_string()))?;
        let placement = self.placement.as_ref().ok_or(ScheduleError::MissingDateTime)?;

        let date = placement.date.ok_or(ScheduleError::MissingDateTime)?;
        if placement.time.trim().is_empty() {
            return Err(ScheduleError::MissingDateTime);
        }
        let start = time_to_minutes(&placement.time)?;
        let room = placement.operating_room.trim();
        if room.is_empty() {
            return Err(ScheduleError::Validation(
                "Debe seleccionar un pabellón".to_string(),
            ));
        }

        if let Some(conflicting_id) =
            store.conflict_for(date, room, TimeSpan::new(start, total), Some(&self.id))
        {
            return Err(ScheduleError::Conflict { conflicting_id });
        }

        let instant = utc_timestamp(date, start).ok_or(ScheduleError::MissingDateTime)?;
        let after = ScheduledSurgery {
            surgery: self.apply_to(&before.surgery, total),
            operating_room: room.to_string(),
            scheduled_date: Some(format_iso_utc(instant)),
            status: before.status,
        };

        Ok(ScheduleChange::EditScheduled {
            before: before.clone(),
            after,
        })
    }
}

/// "Nueva cirugía" form state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub surgery_type: String,
    pub hours: u32,
    pub minutes: u32,
    pub priority: Priority,
    pub pre_surgery_notes: String,
    pub anesthesia_type: String,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            patient_id: String::new(),
            patient_name: String::new(),
            doctor_id: String::new(),
            doctor_name: String::new(),
            surgery_type: String::new(),
            hours: 1,
            minutes: 0,
            priority: Priority::default(),
            pre_surgery_notes: String::new(),
            anesthesia_type: String::new(),
        }
    }
}

impl CreateForm {
    pub fn validate(&self) -> Result<u32, ScheduleError> {
        if self.patient_id.trim().is_empty() {
            return Err(ScheduleError::Validation("Debe seleccionar un paciente".to_string()));
        }
        if self.doctor_id.trim().is_empty() {
            return Err(ScheduleError::Validation("Debe seleccionar un médico".to_string()));
        }
        if self.surgery_type.trim().is_empty() {
            return Err(ScheduleError::Validation(
                "Debe indicar el tipo de cirugía".to_string(),
            ));
        }
        checked_duration(self.hours, self.minutes)
    }

    /// Validate, then reserve a placeholder id and build the create change
    pub fn to_change(&self, store: &mut ScheduleStore) -> Result<ScheduleChange, ScheduleError> {
        let total = self.validate()?;
        let placeholder_id = store.next_placeholder_id();

        let request = CreatePendingSurgeryRequest {
            patient_id: self.patient_id.trim().to_string(),
            doctor_id: self.doctor_id.trim().to_string(),
            surgery_type: self.surgery_type.trim().to_string(),
            estimated_duration: total,
            priority: self.priority,
            pre_surgery_notes: optional_text(&self.pre_surgery_notes),
            anesthesia_type: optional_text(&self.anesthesia_type),
        };
        let preview = PendingSurgery {
            id: placeholder_id.clone(),
            patient_id: request.patient_id.clone(),
            patient_name: self.patient_name.clone(),
            surgery_type: request.surgery_type.clone(),
            doctor_id: request.doctor_id.clone(),
            doctor_name: self.doctor_name.clone(),
            estimated_duration: total,
            priority: self.priority,
            pre_surgery_notes: request.pre_surgery_notes.clone(),
            anesthesia_type: request.anesthesia_type.clone(),
        };

        Ok(ScheduleChange::Create {
            placeholder_id,
            request,
            preview,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::surgery::{SurgeryRecord, SurgeryStatus};
    use test_case::test_case;

    fn store() -> ScheduleStore {
        let mut store = ScheduleStore::new();
        store.replace_pending(&[SurgeryRecord {
            id: "1".to_string(),
            surgery_type: Some("Artroscopia".to_string()),
            estimated_duration: Some(75),
            ..SurgeryRecord::default()
        }]);
        store.replace_scheduled(&[
            SurgeryRecord {
                id: "2".to_string(),
                operating_room: Some("Pabellón 1".to_string()),
                scheduled_date: Some("2025-03-10T09:00:00.000Z".to_string()),
                estimated_duration: Some(60),
                status: Some(SurgeryStatus::Scheduled),
                ..SurgeryRecord::default()
            },
            SurgeryRecord {
                id: "3".to_string(),
                operating_room: Some("Pabellón 1".to_string()),
                scheduled_date: Some("2025-03-10T11:00:00.000Z".to_string()),
                estimated_duration: Some(60),
                status: Some(SurgeryStatus::Scheduled),
                ..SurgeryRecord::default()
            },
        ]);
        store
    }

    #[test_case(0, 30, false ; "half hour is too short")]
    #[test_case(0, 45, false ; "forty five minutes is too short")]
    #[test_case(1, 0, true ; "one hour")]
    #[test_case(2, 15, true ; "two and a quarter")]
    fn test_minimum_duration(hours: u32, minutes: u32, accepted: bool) {
        let mut buffer = EditBuffer::for_pending(store().find_pending("1").unwrap());
        buffer.hours = hours;
        buffer.minutes = minutes;
        assert_eq!(buffer.to_change(&store()).is_ok(), accepted);
    }

    #[test_case(10, 0, false ; "ten hours is beyond the picker")]
    #[test_case(8, 45, true ; "longest picker value")]
    fn test_maximum_duration(hours: u32, minutes: u32, accepted: bool) {
        let mut buffer = EditBuffer::for_pending(store().find_pending("1").unwrap());
        buffer.hours = hours;
        buffer.minutes = minutes;
        assert_eq!(buffer.to_change(&store()).is_ok(), accepted);
    }

    #[test_case(75, (1, 15) ; "exact quarter")]
    #[test_case(100, (1, 45) ; "rounds up to the nearest quarter")]
    #[test_case(97, (1, 30) ; "rounds down to the nearest quarter")]
    #[test_case(600, (8, 45) ; "clamped to the longest option")]
    #[test_case(20, (1, 0) ; "raised to the minimum")]
    #[test_case(0, (1, 0) ; "missing duration")]
    fn test_split_duration_fits_picker(total: u32, expected: (u32, u32)) {
        let (hours, minutes) = split_duration(total);
        assert_eq!((hours, minutes), expected);
        assert!(HOUR_OPTIONS.contains(&hours));
        assert!(MINUTE_OPTIONS.contains(&minutes));
    }

    #[test]
    fn test_notes_edit_on_odd_duration_saves() {
        let mut store = store();
        store.replace_pending(&[SurgeryRecord {
            id: "9".to_string(),
            surgery_type: Some("Colecistectomía".to_string()),
            estimated_duration: Some(100),
            ..SurgeryRecord::default()
        }]);

        let mut buffer = EditBuffer::for_pending(store.find_pending("9").unwrap());
        buffer.pre_surgery_notes = "Ayuno de 8 horas".to_string();

        match buffer.to_change(&store) {
            Ok(ScheduleChange::EditPending { after, .. }) => {
                assert_eq!(after.estimated_duration, 105);
                assert_eq!(after.pre_surgery_notes.as_deref(), Some("Ayuno de 8 horas"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_short_duration_error() {
        let mut buffer = EditBuffer::for_pending(store().find_pending("1").unwrap());
        buffer.hours = 0;
        buffer.minutes = 30;
        assert_eq!(
            buffer.to_change(&store()),
            Err(ScheduleError::DurationTooShort { minutes: 30 })
        );
    }

    #[test]
    fn test_buffer_decomposes_duration() {
        let buffer = EditBuffer::for_pending(store().find_pending("1").unwrap());
        assert_eq!((buffer.hours, buffer.minutes), (1, 15));
        assert!(buffer.placement.is_none());
    }

    #[test]
    fn test_scheduled_buffer_carries_placement() {
        let buffer = EditBuffer::for_scheduled(store().find_scheduled("2").unwrap());
        let placement = buffer.placement.unwrap();
        assert_eq!(placement.time, "09:00");
        assert_eq!(placement.date, NaiveDate::from_ymd_opt(2025, 3, 10));
    }

    #[test]
    fn test_scheduled_edit_requires_time() {
        let store = store();
        let mut buffer = EditBuffer::for_scheduled(store.find_scheduled("2").unwrap());
        if let Some(placement) = buffer.placement.as_mut() {
            placement.time.clear();
        }
        assert_eq!(buffer.to_change(&store), Err(ScheduleError::MissingDateTime));
    }

    #[test]
    fn test_scheduled_edit_checks_overlap() {
        let store = store();
        let mut buffer = EditBuffer::for_scheduled(store.find_scheduled("2").unwrap());
        buffer.hours = 2;
        buffer.minutes = 30;
        assert_eq!(
            buffer.to_change(&store),
            Err(ScheduleError::Conflict {
                conflicting_id: "3".to_string()
            })
        );
    }

    #[test]
    fn test_scheduled_edit_builds_utc_timestamp() {
        let store = store();
        let mut buffer = EditBuffer::for_scheduled(store.find_scheduled("2").unwrap());
        if let Some(placement) = buffer.placement.as_mut() {
            placement.time = "14:30".to_string();
            placement.operating_room = "Emergencias".to_string();
        }
        match buffer.to_change(&store).unwrap() {
            ScheduleChange::EditScheduled { after, .. } => {
                assert_eq!(after.scheduled_date.as_deref(), Some("2025-03-10T14:30:00.000Z"));
                assert_eq!(after.operating_room, "Emergencias");
            }
            other => panic!("unexpected change {:?}", other),
        }
    }

    #[test]
    fn test_create_form_requires_patient() {
        let mut store = ScheduleStore::new();
        let form = CreateForm::default();
        assert!(matches!(
            form.to_change(&mut store),
            Err(ScheduleError::Validation(_))
        ));
        assert_eq!(store.next_placeholder_id(), "local-1");
    }

    #[test]
    fn test_create_form_builds_placeholder() {
        let mut store = ScheduleStore::new();
        let form = CreateForm {
            patient_id: "4".to_string(),
            patient_name: "Ana Rodríguez".to_string(),
            doctor_id: "2".to_string(),
            doctor_name: "Dra. Sánchez Ruiz".to_string(),
            surgery_type: "Artroscopia".to_string(),
            hours: 1,
            minutes: 15,
            ..CreateForm::default()
        };
        match form.to_change(&mut store).unwrap() {
            ScheduleChange::Create {
                placeholder_id,
                request,
                preview,
            } => {
                assert_eq!(placeholder_id, "local-1");
                assert_eq!(request.estimated_duration, 75);
                assert_eq!(preview.patient_name, "Ana Rodríguez");
            }
            other => panic!("unexpected change {:?}", other),
        }
    }
}
