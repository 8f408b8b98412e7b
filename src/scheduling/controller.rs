//! Drag and drop between the pending list and the room grid.
//!
//! Only one thing can be in flight at a time. Every drop, accepted or not,
//! returns the controller to [`DragState::Idle`].

use chrono::{Duration, NaiveDate, Utc};

use super::change::{commit_change, ScheduleChange, Slot};
use super::conflict::TimeSpan;
use super::geometry::{minutes_to_time, GridGeometry};
use super::store::ScheduleStore;
use super::ScheduleError;
use crate::models::settings::ScheduleConfig;
use crate::models::surgery::{PendingSurgery, ScheduledSurgery, DEFAULT_DURATION_MINUTES};
use crate::services::surgery::SurgeryApi;
use crate::utils::date::{format_iso_utc, utc_timestamp};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    DraggingPending(PendingSurgery),
    DraggingScheduled(ScheduledSurgery),
}

impl DragState {
    pub fn dragged_id(&self) -> Option<&str> {
        match self {
            DragState::Idle => None,
            DragState::DraggingPending(surgery) => Some(&surgery.id),
            DragState::DraggingScheduled(surgery) => Some(surgery.id()),
        }
    }

    /// Length of the block being dragged
    pub fn duration_minutes(&self) -> u32 {
        match self {
            DragState::Idle => DEFAULT_DURATION_MINUTES,
            DragState::DraggingPending(surgery) => surgery.duration_minutes(),
            DragState::DraggingScheduled(surgery) => surgery.duration_minutes(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    geometry: GridGeometry,
    visible_date: NaiveDate,
    rooms: Vec<String>,
}

impl DragController {
    pub fn new(geometry: GridGeometry, rooms: Vec<String>, visible_date: NaiveDate) -> Self {
        Self {
            state: DragState::Idle,
            geometry,
            visible_date,
            rooms,
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(
            GridGeometry::from_config(config),
            config.operating_rooms.clone(),
            Utc::now().date_naive(),
        )
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn begin_pending_drag(&mut self, surgery: PendingSurgery) {
        log::debug!("Dragging pending surgery {}", surgery.id);
        self.state = DragState::DraggingPending(surgery);
    }

    pub fn begin_scheduled_drag(&mut self, surgery: ScheduledSurgery) {
        log::debug!("Dragging scheduled surgery {}", surgery.id());
        self.state = DragState::DraggingScheduled(surgery);
    }

    /// Drop outside any target
    pub fn abandon(&mut self) {
        self.state = DragState::Idle;
    }

    /// End the current drag, whatever its result
    pub fn finish(&mut self) -> DragState {
        std::mem::take(&mut self.state)
    }

    pub fn visible_date(&self) -> NaiveDate {
        self.visible_date
    }

    pub fn set_visible_date(&mut self, date: NaiveDate) {
        self.visible_date = date;
    }

    pub fn next_day(&mut self) {
        self.visible_date += Duration::days(1);
    }

    pub fn previous_day(&mut self) {
        self.visible_date -= Duration::days(1);
    }

    pub fn go_to_today(&mut self) {
        self.visible_date = Utc::now().date_naive();
    }

    /// Build a slot on the visible day and reject it if it overlaps a booking
    pub fn check_slot(
        &self,
        store: &ScheduleStore,
        room: &str,
        start_minutes: u32,
        duration_minutes: u32,
        exclude: Option<&str>,
    ) -> Result<Slot, ScheduleError> {
        if !self.rooms.iter().any(|known| known == room) {
            return Err(ScheduleError::UnknownRoom(room.to_string()));
        }

        let span = TimeSpan::new(start_minutes, duration_minutes);
        if let Some(conflicting_id) = store.conflict_for(self.visible_date, room, span, exclude) {
            log::info!(
                "Rejected slot {} in {}: overlaps surgery {}",
                minutes_to_time(start_minutes),
                room,
                conflicting_id
            );
            return Err(ScheduleError::Conflict { conflicting_id });
        }

        let instant =
            utc_timestamp(self.visible_date, start_minutes).ok_or(ScheduleError::MissingDateTime)?;
        Ok(Slot {
            operating_room: room.to_string(),
            start_time: minutes_to_time(start_minutes),
            scheduled_at: format_iso_utc(instant),
            duration_minutes,
        })
    }

    /// Plan a drop at `pixel_offset` from the top of `room`'s column
    pub fn plan_grid_drop(
        &self,
        store: &ScheduleStore,
        room: &str,
        pixel_offset: f32,
    ) -> Result<ScheduleChange, ScheduleError> {
        let start_minutes =
            self.geometry.start_of_day_minutes() + self.geometry.snap_to_interval(pixel_offset);
        let duration = self.state.duration_minutes();

        match &self.state {
            DragState::Idle => Err(ScheduleError::NothingDragged),
            DragState::DraggingPending(surgery) => {
                let slot = self.check_slot(store, room, start_minutes, duration, Some(&surgery.id))?;
                Ok(ScheduleChange::Schedule {
                    surgery: surgery.clone(),
                    slot,
                })
            }
            DragState::DraggingScheduled(surgery) => {
                let slot = self.check_slot(store, room, start_minutes, duration, Some(surgery.id()))?;
                Ok(ScheduleChange::Move {
                    surgery: surgery.clone(),
                    slot,
                })
            }
        }
    }

    /// Plan a drop on the pending list; `None` when a pending request is dropped back on it
    pub fn plan_pending_drop(&self) -> Result<Option<ScheduleChange>, ScheduleError> {
        match &self.state {
            DragState::Idle => Err(ScheduleError::NothingDragged),
            DragState::DraggingPending(_) => Ok(None),
            DragState::DraggingScheduled(surgery) => Ok(Some(ScheduleChange::Unschedule {
                surgery: surgery.clone(),
            })),
        }
    }

    /// Drop on the grid and wait for the backend
    pub fn drop_on_grid(
        &mut self,
        store: &mut ScheduleStore,
        api: &dyn SurgeryApi,
        room: &str,
        pixel_offset: f32,
    ) -> Result<(), ScheduleError> {
        let planned = self.plan_grid_drop(store, room, pixel_offset);
        self.finish();
        commit_change(store, api, planned?)
    }

    /// Drop on the pending list and wait for the backend
    pub fn drop_on_pending(
        &mut self,
        store: &mut ScheduleStore,
        api: &dyn SurgeryApi,
    ) -> Result<(), ScheduleError> {
        let planned = self.plan_pending_drop();
        self.finish();
        match planned? {
            Some(change) => commit_change(store, api, change),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::surgery::{SurgeryRecord, SurgeryStatus};
    use crate::services::surgery::MockSurgeryApi;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn controller() -> DragController {
        DragController::from_config(&ScheduleConfig::default()).with_date(day())
    }

    impl DragController {
        fn with_date(mut self, date: NaiveDate) -> Self {
            self.visible_date = date;
            self
        }
    }

    fn booked_store() -> ScheduleStore {
        let mut store = ScheduleStore::new();
        store.replace_scheduled(&[SurgeryRecord {
            id: "10".to_string(),
            operating_room: Some("Pabellón 1".to_string()),
            scheduled_date: Some("2025-03-10T10:00:00.000Z".to_string()),
            estimated_duration: Some(90),
            status: Some(SurgeryStatus::Scheduled),
            ..SurgeryRecord::default()
        }]);
        store
    }

    #[test]
    fn test_idle_drop_is_rejected() {
        let controller = controller();
        let err = controller
            .plan_grid_drop(&ScheduleStore::new(), "Pabellón 1", 60.0)
            .unwrap_err();
        assert_eq!(err, ScheduleError::NothingDragged);
    }

    #[test]
    fn test_grid_drop_snaps_and_builds_utc_slot() {
        let mut controller = controller();
        controller.begin_pending_drag(PendingSurgery {
            id: "1".to_string(),
            estimated_duration: 90,
            ..PendingSurgery::default()
        });

        let change = controller
            .plan_grid_drop(&booked_store(), "Pabellón 2", 62.0)
            .unwrap();
        match change {
            ScheduleChange::Schedule { slot, .. } => {
                assert_eq!(slot.start_time, "09:00");
                assert_eq!(slot.scheduled_at, "2025-03-10T09:00:00.000Z");
                assert_eq!(slot.duration_minutes, 90);
            }
            other => panic!("unexpected change {:?}", other),
        }
    }

    #[test]
    fn test_overlapping_drop_is_rejected() {
        let mut controller = controller();
        controller.begin_pending_drag(PendingSurgery {
            id: "1".to_string(),
            estimated_duration: 60,
            ..PendingSurgery::default()
        });
        let err = controller
            .plan_grid_drop(&booked_store(), "Pabellón 1", 105.0)
            .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::Conflict {
                conflicting_id: "10".to_string()
            }
        );
    }

    #[test]
    fn test_moving_a_booking_ignores_itself() {
        let store = booked_store();
        let mut controller = controller();
        controller.begin_scheduled_drag(store.find_scheduled("10").cloned().unwrap());
        let change = controller.plan_grid_drop(&store, "Pabellón 1", 150.0).unwrap();
        assert!(matches!(change, ScheduleChange::Move { .. }));
    }

    #[test]
    fn test_unknown_room_is_rejected() {
        let mut controller = controller();
        controller.begin_pending_drag(PendingSurgery::default());
        let err = controller
            .plan_grid_drop(&ScheduleStore::new(), "Pabellón 9", 0.0)
            .unwrap_err();
        assert_eq!(err, ScheduleError::UnknownRoom("Pabellón 9".to_string()));
    }

    #[test]
    fn test_rejected_drop_returns_to_idle_without_requests() {
        let mut store = booked_store();
        let api = MockSurgeryApi::new();
        let mut controller = controller();
        controller.begin_pending_drag(PendingSurgery {
            id: "1".to_string(),
            estimated_duration: 60,
            ..PendingSurgery::default()
        });

        let result = controller.drop_on_grid(&mut store, &api, "Pabellón 1", 120.0);
        assert!(matches!(result, Err(ScheduleError::Conflict { .. })));
        assert_eq!(controller.state(), &DragState::Idle);
        assert_eq!(store.scheduled().len(), 1);
    }

    #[test]
    fn test_pending_dropped_on_pending_is_noop() {
        let mut controller = controller();
        controller.begin_pending_drag(PendingSurgery::default());
        assert_eq!(controller.plan_pending_drop(), Ok(None));
    }

    #[test]
    fn test_day_navigation() {
        let mut controller = controller();
        controller.next_day();
        assert_eq!(controller.visible_date(), NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        controller.previous_day();
        controller.previous_day();
        assert_eq!(controller.visible_date(), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
    }
}
