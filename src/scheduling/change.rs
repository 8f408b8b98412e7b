//! Schedule mutations and their backend execution.
//!
//! A [`ScheduleChange`] is planned on the UI thread, applied optimistically to
//! the store and executed against a [`SurgeryApi`]. Executing touches only the
//! API, so it can run on a worker thread.

use super::store::ScheduleStore;
use super::ScheduleError;
use crate::models::surgery::{
    CreatePendingSurgeryRequest, PendingSurgery, ScheduledSurgery, SurgeryRecord, SurgeryStatus,
    UpdateSurgeryRequest,
};
use crate::services::api::ApiError;
use crate::services::surgery::SurgeryApi;

/// Where and when a surgery lands on the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub operating_room: String,
    /// `HH:MM` as shown on the grid
    pub start_time: String,
    /// ISO-8601 UTC timestamp sent to the backend
    pub scheduled_at: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleChange {
    /// Pending request dropped on the grid
    Schedule { surgery: PendingSurgery, slot: Slot },
    /// Scheduled surgery dragged to another slot
    Move { surgery: ScheduledSurgery, slot: Slot },
    /// Scheduled surgery dropped back on the pending list
    Unschedule { surgery: ScheduledSurgery },
    EditPending {
        before: PendingSurgery,
        after: PendingSurgery,
    },
    EditScheduled {
        before: ScheduledSurgery,
        after: ScheduledSurgery,
    },
    Create {
        placeholder_id: String,
        request: CreatePendingSurgeryRequest,
        preview: PendingSurgery,
    },
}

impl ScheduleChange {
    /// Id of the record this change touches
    pub fn id(&self) -> &str {
        match self {
            ScheduleChange::Schedule { surgery, .. } => &surgery.id,
            ScheduleChange::Move { surgery, .. } | ScheduleChange::Unschedule { surgery } => {
                surgery.id()
            }
            ScheduleChange::EditPending { before, .. } => &before.id,
            ScheduleChange::EditScheduled { before, .. } => before.id(),
            ScheduleChange::Create { placeholder_id, .. } => placeholder_id,
        }
    }

    /// Toast shown once the backend accepts the change
    pub fn success_message(&self) -> &'static str {
        match self {
            ScheduleChange::Schedule { .. } => "Cirugía programada",
            ScheduleChange::Move { .. } => "Cirugía reprogramada",
            ScheduleChange::Unschedule { .. } => "Cirugía devuelta a pendientes",
            ScheduleChange::EditPending { .. } | ScheduleChange::EditScheduled { .. } => {
                "Cambios guardados"
            }
            ScheduleChange::Create { .. } => "Cirugía creada",
        }
    }
}

/// What the backend answered for a change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeOutcome {
    /// Record echoed by the main write, possibly partial
    pub primary: Option<SurgeryRecord>,
    /// Status confirmed by the follow-up status update
    pub status: Option<SurgeryStatus>,
}

fn edit_request(surgery: &PendingSurgery) -> UpdateSurgeryRequest {
    UpdateSurgeryRequest {
        surgery_type: Some(surgery.surgery_type.clone()),
        estimated_duration: Some(surgery.estimated_duration),
        priority: Some(surgery.priority),
        pre_surgery_notes: surgery.pre_surgery_notes.clone(),
        anesthesia_type: surgery.anesthesia_type.clone(),
        ..UpdateSurgeryRequest::default()
    }
}

fn placement_request(slot: &Slot) -> UpdateSurgeryRequest {
    UpdateSurgeryRequest {
        scheduled_date: Some(Some(slot.scheduled_at.clone())),
        operating_room: Some(Some(slot.operating_room.clone())),
        ..UpdateSurgeryRequest::default()
    }
}

/// Run a change against the backend.
///
/// Scheduling a pending request takes two calls. When the status call fails
/// after the placement was written, the placement is cleared again before the
/// error is returned.
pub fn execute_change(
    api: &dyn SurgeryApi,
    change: &ScheduleChange,
) -> Result<ChangeOutcome, ScheduleError> {
    match change {
        ScheduleChange::Schedule { surgery, slot } => {
            let placed = api.update_surgery(&surgery.id, &placement_request(slot))?;
            match api.update_status(&surgery.id, SurgeryStatus::Scheduled) {
                Ok(status) => Ok(ChangeOutcome {
                    primary: placed.data,
                    status: status
                        .data
                        .and_then(|record| record.status)
                        .or(Some(SurgeryStatus::Scheduled)),
                }),
                Err(error) => {
                    log::warn!(
                        "Status update failed for surgery {}: {}; clearing placement",
                        surgery.id,
                        error
                    );
                    let compensated = compensate_placement(api, &surgery.id);
                    Err(ScheduleError::StatusUpdateFailed { error, compensated })
                }
            }
        }
        ScheduleChange::Move { surgery, slot } => {
            let placed = api.update_surgery(surgery.id(), &placement_request(slot))?;
            Ok(ChangeOutcome {
                primary: placed.data,
                status: None,
            })
        }
        ScheduleChange::Unschedule { surgery } => {
            api.cancel_surgery(surgery.id())?;
            Ok(ChangeOutcome::default())
        }
        ScheduleChange::EditPending { before, after } => {
            let updated = api.update_surgery(&before.id, &edit_request(after))?;
            Ok(ChangeOutcome {
                primary: updated.data,
                status: None,
            })
        }
        ScheduleChange::EditScheduled { before, after } => {
            let mut request = edit_request(&after.surgery);
            request.scheduled_date = Some(after.scheduled_date.clone());
            request.operating_room = Some(Some(after.operating_room.clone()));
            let updated = api.update_surgery(before.id(), &request)?;
            Ok(ChangeOutcome {
                primary: updated.data,
                status: None,
            })
        }
        ScheduleChange::Create { request, .. } => {
            let created = api.create_pending(request)?;
            let record = created.data.ok_or_else(|| {
                ApiError::Malformed("create response did not include the surgery".to_string())
            })?;
            log::info!("Created pending surgery {}", record.id);
            Ok(ChangeOutcome {
                primary: Some(record),
                status: None,
            })
        }
    }
}

fn compensate_placement(api: &dyn SurgeryApi, id: &str) -> bool {
    let clear = UpdateSurgeryRequest {
        scheduled_date: Some(None),
        operating_room: Some(None),
        ..UpdateSurgeryRequest::default()
    };
    match api.update_surgery(id, &clear) {
        Ok(_) => true,
        Err(err) => {
            log::error!(
                "Could not clear placement of surgery {} after failed status update: {}",
                id,
                err
            );
            false
        }
    }
}

/// Apply, execute and settle a change in one go.
///
/// The store ends either confirmed or exactly as it was before the call.
pub fn commit_change(
    store: &mut ScheduleStore,
    api: &dyn SurgeryApi,
    change: ScheduleChange,
) -> Result<(), ScheduleError> {
    let point = store.apply_optimistic(&change);
    match execute_change(api, &change) {
        Ok(outcome) => {
            store.confirm(&change, outcome);
            Ok(())
        }
        Err(err) => {
            log::warn!("Rolling back change to surgery {}: {}", change.id(), err);
            store.rollback(point);
            Err(err)
        }
    }
}
