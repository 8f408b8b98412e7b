//! Merging server responses into optimistic local records.
//!
//! Write endpoints may echo back a partial record. A server field wins when it
//! is present and non-blank; otherwise the pre-request local value is kept.

use crate::models::surgery::{PendingSurgery, ScheduledSurgery, SurgeryRecord};

/// Where a locally held record stands relative to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordLifecycle {
    /// Created on this client, not yet known to the server
    LocalOnly,
    /// Local edit applied, server response outstanding
    PendingConfirmation,
    /// Matches the last server response
    Confirmed,
}

impl RecordLifecycle {
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, RecordLifecycle::Confirmed)
    }
}

fn pick_text(server: Option<&String>, local: &str) -> String {
    match server.map(|value| value.trim()) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => local.to_string(),
    }
}

fn pick_optional(server: Option<&String>, local: &Option<String>) -> Option<String> {
    match server {
        Some(value) if !value.trim().is_empty() => Some(value.clone()),
        _ => local.clone(),
    }
}

/// Merge a write response into a pending record
pub fn merge_pending(local: &PendingSurgery, server: Option<&SurgeryRecord>) -> PendingSurgery {
    let Some(server) = server else {
        return local.clone();
    };

    let doctor_name = server.doctor_name();
    PendingSurgery {
        id: pick_text(Some(&server.id), &local.id),
        patient_id: pick_text(server.patient_id.as_ref(), &local.patient_id),
        patient_name: pick_text(server.patient_name.as_ref(), &local.patient_name),
        surgery_type: pick_text(server.surgery_type.as_ref(), &local.surgery_type),
        doctor_id: pick_text(server.doctor_id.as_ref(), &local.doctor_id),
        doctor_name: pick_text(doctor_name.as_ref(), &local.doctor_name),
        estimated_duration: server
            .estimated_duration
            .filter(|minutes| *minutes > 0)
            .unwrap_or(local.estimated_duration),
        priority: server.priority.unwrap_or(local.priority),
        pre_surgery_notes: pick_optional(
            server.pre_surgery_notes.as_ref(),
            &local.pre_surgery_notes,
        ),
        anesthesia_type: pick_optional(server.anesthesia_type.as_ref(), &local.anesthesia_type),
    }
}

/// Merge a write response into a scheduled record
pub fn merge_scheduled(
    local: &ScheduledSurgery,
    server: Option<&SurgeryRecord>,
) -> ScheduledSurgery {
    let Some(record) = server else {
        return local.clone();
    };

    ScheduledSurgery {
        surgery: merge_pending(&local.surgery, Some(record)),
        operating_room: pick_text(record.operating_room.as_ref(), &local.operating_room),
        scheduled_date: pick_optional(record.scheduled_date.as_ref(), &local.scheduled_date),
        status: record.status.unwrap_or(local.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::surgery::{Priority, SurgeryStatus};
    use pretty_assertions::assert_eq;

    fn local() -> ScheduledSurgery {
        PendingSurgery {
            id: "5".to_string(),
            patient_id: "11".to_string(),
            patient_name: "Juan Pérez".to_string(),
            surgery_type: "Apendicectomía".to_string(),
            doctor_id: "3".to_string(),
            doctor_name: "Dr. García Martínez".to_string(),
            estimated_duration: 90,
            priority: Priority::High,
            pre_surgery_notes: Some("Ayuno 8h".to_string()),
            anesthesia_type: None,
        }
        .into_scheduled("Pabellón 1", "2025-03-10T09:00:00.000Z", SurgeryStatus::Scheduled)
    }

    #[test]
    fn test_missing_response_keeps_local() {
        let merged = merge_scheduled(&local(), None);
        assert_eq!(merged, local());
    }

    #[test]
    fn test_omitted_display_fields_fall_back_to_local() {
        let response = SurgeryRecord {
            id: "5".to_string(),
            operating_room: Some("Pabellón 2".to_string()),
            patient_name: Some("  ".to_string()),
            ..SurgeryRecord::default()
        };

        let merged = merge_scheduled(&local(), Some(&response));
        assert_eq!(merged.surgery.patient_name, "Juan Pérez");
        assert_eq!(merged.surgery.doctor_name, "Dr. García Martínez");
        assert_eq!(merged.operating_room, "Pabellón 2");
        assert_eq!(merged.surgery.estimated_duration, 90);
        assert_eq!(merged.surgery.pre_surgery_notes.as_deref(), Some("Ayuno 8h"));
    }

    #[test]
    fn test_server_fields_win() {
        let response = SurgeryRecord {
            id: "5".to_string(),
            patient_name: Some("Juan Pérez Soto".to_string()),
            doctor_first_name: Some("Ana".to_string()),
            doctor_last_name: Some("Rojas".to_string()),
            estimated_duration: Some(120),
            status: Some(SurgeryStatus::InProgress),
            ..SurgeryRecord::default()
        };

        let merged = merge_scheduled(&local(), Some(&response));
        assert_eq!(merged.surgery.patient_name, "Juan Pérez Soto");
        assert_eq!(merged.surgery.doctor_name, "Ana Rojas");
        assert_eq!(merged.duration_minutes(), 120);
        assert_eq!(merged.status, SurgeryStatus::InProgress);
    }

    #[test]
    fn test_server_id_replaces_placeholder() {
        let mut placeholder = local().to_pending();
        placeholder.id = "local-1".to_string();
        let response = SurgeryRecord {
            id: "42".to_string(),
            ..SurgeryRecord::default()
        };
        assert_eq!(merge_pending(&placeholder, Some(&response)).id, "42");
    }

    #[test]
    fn test_lifecycle_in_flight() {
        assert!(RecordLifecycle::LocalOnly.is_in_flight());
        assert!(RecordLifecycle::PendingConfirmation.is_in_flight());
        assert!(!RecordLifecycle::Confirmed.is_in_flight());
    }
}
