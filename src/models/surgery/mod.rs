// Surgery module
// Pending and scheduled surgery models plus the backend wire shapes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::pagination::Pagination;
use super::serde_ids;

/// Duration assumed when the backend does not report one
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Clinical priority of a surgery request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Display label (es-CL)
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Baja",
            Priority::Medium => "Media",
            Priority::High => "Alta",
            Priority::Urgent => "Urgente",
        }
    }
}

/// Lifecycle status as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgeryStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl SurgeryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurgeryStatus::Pending => "pending",
            SurgeryStatus::Scheduled => "scheduled",
            SurgeryStatus::InProgress => "in_progress",
            SurgeryStatus::Completed => "completed",
            SurgeryStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SurgeryStatus::Pending => "Pendiente",
            SurgeryStatus::Scheduled => "Programada",
            SurgeryStatus::InProgress => "En curso",
            SurgeryStatus::Completed => "Completada",
            SurgeryStatus::Cancelled => "Cancelada",
        }
    }

    /// Whether a surgery in this status occupies its operating room
    pub fn blocks_room(&self) -> bool {
        matches!(self, SurgeryStatus::Scheduled | SurgeryStatus::InProgress)
    }
}

/// A surgery request not yet bound to a room or start time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSurgery {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub surgery_type: String,
    pub doctor_id: String,
    pub doctor_name: String,
    /// Minutes
    pub estimated_duration: u32,
    pub priority: Priority,
    pub pre_surgery_notes: Option<String>,
    pub anesthesia_type: Option<String>,
}

impl PendingSurgery {
    /// Duration used for grid placement; an unset (zero) duration counts as one hour
    pub fn duration_minutes(&self) -> u32 {
        if self.estimated_duration == 0 {
            DEFAULT_DURATION_MINUTES
        } else {
            self.estimated_duration
        }
    }

    pub fn duration_label(&self) -> String {
        format_duration(self.duration_minutes())
    }

    /// Bind this request to a room and start timestamp
    pub fn into_scheduled(
        self,
        operating_room: impl Into<String>,
        scheduled_date: impl Into<String>,
        status: SurgeryStatus,
    ) -> ScheduledSurgery {
        ScheduledSurgery {
            surgery: self,
            operating_room: operating_room.into(),
            scheduled_date: Some(scheduled_date.into()),
            status,
        }
    }
}

/// A surgery bound to an operating room and an absolute start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSurgery {
    pub surgery: PendingSurgery,
    pub operating_room: String,
    /// Raw timestamp as received or built locally (ISO-8601, UTC)
    pub scheduled_date: Option<String>,
    pub status: SurgeryStatus,
}

impl ScheduledSurgery {
    pub fn id(&self) -> &str {
        &self.surgery.id
    }

    pub fn duration_minutes(&self) -> u32 {
        self.surgery.duration_minutes()
    }

    /// Rebuild the unscheduled request from this record
    pub fn to_pending(&self) -> PendingSurgery {
        self.surgery.clone()
    }
}

/// Format a duration the way the scheduling page shows it ("1h 30min")
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}min", minutes / 60, minutes % 60)
}

/// Surgery as returned by the backend; write envelopes may omit any display field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurgeryRecord {
    #[serde(deserialize_with = "serde_ids::id")]
    pub id: String,
    #[serde(default, deserialize_with = "serde_ids::optional_id")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_rut: Option<String>,
    #[serde(default, deserialize_with = "serde_ids::optional_id")]
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub doctor_first_name: Option<String>,
    #[serde(default)]
    pub doctor_last_name: Option<String>,
    #[serde(default)]
    pub surgery_type: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub operating_room: Option<String>,
    #[serde(default)]
    pub status: Option<SurgeryStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub pre_surgery_notes: Option<String>,
    #[serde(default)]
    pub post_surgery_notes: Option<String>,
    #[serde(default)]
    pub anesthesia_type: Option<String>,
    #[serde(default, deserialize_with = "serde_ids::optional_id")]
    pub assistant_doctor_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl SurgeryRecord {
    /// "First Last" when the backend sent at least one of the name parts
    pub fn doctor_name(&self) -> Option<String> {
        let first = self.doctor_first_name.as_deref().unwrap_or("").trim();
        let last = self.doctor_last_name.as_deref().unwrap_or("").trim();
        let full = format!("{} {}", first, last).trim().to_string();
        if full.is_empty() {
            None
        } else {
            Some(full)
        }
    }

    /// Build a pending surgery from a full list record
    pub fn to_pending_surgery(&self) -> PendingSurgery {
        PendingSurgery {
            id: self.id.clone(),
            patient_id: self.patient_id.clone().unwrap_or_default(),
            patient_name: self.patient_name.clone().unwrap_or_default(),
            surgery_type: self.surgery_type.clone().unwrap_or_default(),
            doctor_id: self.doctor_id.clone().unwrap_or_default(),
            doctor_name: self.doctor_name().unwrap_or_default(),
            estimated_duration: self
                .estimated_duration
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            priority: self.priority.unwrap_or_default(),
            pre_surgery_notes: self.pre_surgery_notes.clone(),
            anesthesia_type: self.anesthesia_type.clone(),
        }
    }

    /// Build a scheduled surgery from a full list record
    pub fn to_scheduled_surgery(&self) -> ScheduledSurgery {
        ScheduledSurgery {
            surgery: self.to_pending_surgery(),
            operating_room: self.operating_room.clone().unwrap_or_default(),
            scheduled_date: self.scheduled_date.clone(),
            status: self.status.unwrap_or(SurgeryStatus::Scheduled),
        }
    }
}

/// `{message, data}` envelope returned by write endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurgeryEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<SurgeryRecord>,
}

/// Paged list of surgeries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurgeryListResponse {
    #[serde(default)]
    pub surgeries: Vec<SurgeryRecord>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Filters for `GET /api/scheduled-surgeries`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurgeryQuery {
    pub status: Option<SurgeryStatus>,
    pub date: Option<NaiveDate>,
    pub operating_room: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SurgeryQuery {
    pub fn with_status(status: SurgeryStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Query-string pairs in a stable order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(date) = self.date {
            pairs.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(room) = &self.operating_room {
            pairs.push(("operating_room", room.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Body of `POST /api/scheduled-surgeries/pending`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePendingSurgeryRequest {
    #[serde(serialize_with = "serde_ids::serialize_id")]
    pub patient_id: String,
    #[serde(serialize_with = "serde_ids::serialize_id")]
    pub doctor_id: String,
    pub surgery_type: String,
    pub estimated_duration: u32,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_surgery_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anesthesia_type: Option<String>,
}

/// Body of `PUT /api/scheduled-surgeries/:id`
///
/// `Some(None)` on the schedule fields serializes as `null`, which clears them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateSurgeryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_room: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surgery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_surgery_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anesthesia_type: Option<String>,
}

/// Body of `PATCH /api/scheduled-surgeries/:id/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateStatusRequest {
    pub status: SurgeryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_record_deserializes_with_numeric_ids() {
        let json = r#"{
            "id": 12,
            "patient_id": 3,
            "doctor_id": "7",
            "surgery_type": "Apendicectomía",
            "scheduled_date": "2025-03-10T09:00:00.000Z",
            "estimated_duration": 90,
            "operating_room": "Pabellón 1",
            "status": "in_progress",
            "priority": "urgent",
            "pre_surgery_notes": null,
            "patient_name": "Juan Pérez",
            "doctor_first_name": "Ana",
            "doctor_last_name": "Silva"
        }"#;

        let record: SurgeryRecord = serde_json::from_str(json).unwrap();
        let scheduled = record.to_scheduled_surgery();

        assert_eq!(scheduled.id(), "12");
        assert_eq!(scheduled.surgery.patient_id, "3");
        assert_eq!(scheduled.surgery.doctor_id, "7");
        assert_eq!(scheduled.surgery.doctor_name, "Ana Silva");
        assert_eq!(scheduled.status, SurgeryStatus::InProgress);
        assert_eq!(scheduled.surgery.priority, Priority::Urgent);
        assert_eq!(scheduled.duration_minutes(), 90);
    }

    #[test]
    fn test_sparse_envelope_deserializes() {
        let envelope: SurgeryEnvelope =
            serde_json::from_str(r#"{"message": "ok", "data": {"id": "5", "operating_room": "Emergencias"}}"#)
                .unwrap();
        let data = envelope.data.unwrap();
        assert_eq!(data.id, "5");
        assert_eq!(data.patient_name, None);
        assert_eq!(data.doctor_name(), None);
        assert_eq!(data.operating_room.as_deref(), Some("Emergencias"));
    }

    #[test]
    fn test_update_request_clears_schedule_with_null() {
        let request = UpdateSurgeryRequest {
            scheduled_date: Some(None),
            operating_room: Some(None),
            ..UpdateSurgeryRequest::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"scheduled_date": null, "operating_room": null})
        );
    }

    #[test]
    fn test_zero_duration_falls_back_to_one_hour() {
        let record = SurgeryRecord {
            id: "1".to_string(),
            estimated_duration: Some(0),
            ..SurgeryRecord::default()
        };
        assert_eq!(record.to_pending_surgery().duration_minutes(), 60);
        assert_eq!(record.to_pending_surgery().duration_label(), "1h 0min");
    }

    #[test]
    fn test_query_pairs_are_ordered() {
        let query = SurgeryQuery {
            status: Some(SurgeryStatus::Scheduled),
            date: NaiveDate::from_ymd_opt(2025, 3, 10),
            operating_room: None,
            page: Some(1),
            limit: Some(100),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("status", "scheduled".to_string()),
                ("date", "2025-03-10".to_string()),
                ("page", "1".to_string()),
                ("limit", "100".to_string()),
            ]
        );
    }
}
