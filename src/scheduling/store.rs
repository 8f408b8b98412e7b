//! Local schedule store.
//!
//! Owns the pending and scheduled collections shown on the scheduling page,
//! answers per-day and per-room queries for the grid, and keeps the
//! optimistic bookkeeping (lifecycle per id plus rollback points).

use std::collections::HashMap;

use chrono::{NaiveDate, Timelike};

use super::change::{ChangeOutcome, ScheduleChange};
use super::conflict::{find_conflict, TimeSpan};
use super::geometry::time_to_minutes;
use super::reconcile::{merge_pending, merge_scheduled, RecordLifecycle};
use crate::models::surgery::{PendingSurgery, ScheduledSurgery, SurgeryRecord, SurgeryStatus};
use crate::utils::date::parse_timestamp;

/// Display `HH:MM` of a scheduled timestamp.
///
/// UTC strings (`...Z` / `+00:00`) are read literally; anything else is parsed
/// and converted to UTC. Unparseable input degrades to `"00:00"`.
pub fn derive_display_time(scheduled_date: Option<&str>) -> String {
    let Some(raw) = scheduled_date.map(str::trim).filter(|raw| !raw.is_empty()) else {
        log::warn!("Scheduled surgery has no date; showing 00:00");
        return "00:00".to_string();
    };

    let is_utc_literal = (raw.ends_with('Z') || raw.ends_with("+00:00"))
        && raw.as_bytes().get(10).is_some_and(|byte| *byte == b'T' || *byte == b' ');
    if is_utc_literal {
        if let Some(literal) = raw.get(11..16) {
            if time_to_minutes(literal).is_ok() {
                return literal.to_string();
            }
        }
    }

    match parse_timestamp(raw) {
        Some(instant) => instant.format("%H:%M").to_string(),
        None => {
            log::warn!("Could not parse scheduled date '{}'; showing 00:00", raw);
            "00:00".to_string()
        }
    }
}

/// Calendar day (UTC) and start minute of a scheduled timestamp
pub fn scheduled_start(scheduled_date: Option<&str>) -> Option<(NaiveDate, u32)> {
    let instant = parse_timestamp(scheduled_date?)?;
    Some((instant.date_naive(), instant.hour() * 60 + instant.minute()))
}

/// Booked interval of a scheduled surgery, if its timestamp is usable
pub fn booked_span(surgery: &ScheduledSurgery) -> Option<TimeSpan> {
    scheduled_start(surgery.scheduled_date.as_deref())
        .map(|(_, start)| TimeSpan::new(start, surgery.duration_minutes()))
}

/// Snapshot taken before an optimistic change, restored on failure
#[derive(Debug, Clone, PartialEq)]
pub struct RollbackPoint {
    id: String,
    pending: Option<(usize, PendingSurgery)>,
    scheduled: Option<(usize, ScheduledSurgery)>,
    lifecycle: Option<RecordLifecycle>,
    selected: Option<String>,
}

impl RollbackPoint {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Default)]
pub struct ScheduleStore {
    pending: Vec<PendingSurgery>,
    scheduled: Vec<ScheduledSurgery>,
    lifecycle: HashMap<String, RecordLifecycle>,
    selected: Option<String>,
    next_local_id: u64,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[PendingSurgery] {
        &self.pending
    }

    pub fn scheduled(&self) -> &[ScheduledSurgery] {
        &self.scheduled
    }

    /// Replace the pending column with a fresh fetch; unconfirmed local records survive
    pub fn replace_pending(&mut self, records: &[SurgeryRecord]) {
        let mut local_only = Vec::new();
        for surgery in std::mem::take(&mut self.pending) {
            if self.lifecycle(&surgery.id) == Some(RecordLifecycle::LocalOnly) {
                local_only.push(surgery);
            } else {
                self.lifecycle.remove(&surgery.id);
            }
        }

        self.pending = records
            .iter()
            .map(SurgeryRecord::to_pending_surgery)
            .collect();
        for surgery in &self.pending {
            self.lifecycle
                .insert(surgery.id.clone(), RecordLifecycle::Confirmed);
        }
        self.pending.extend(local_only);
    }

    /// Replace the scheduled collection with a fresh fetch
    pub fn replace_scheduled(&mut self, records: &[SurgeryRecord]) {
        for surgery in std::mem::take(&mut self.scheduled) {
            self.lifecycle.remove(surgery.id());
        }

        self.scheduled = records
            .iter()
            .map(SurgeryRecord::to_scheduled_surgery)
            .collect();
        for surgery in &self.scheduled {
            self.lifecycle
                .insert(surgery.id().to_string(), RecordLifecycle::Confirmed);
        }
    }

    pub fn find_pending(&self, id: &str) -> Option<&PendingSurgery> {
        self.pending.iter().find(|surgery| surgery.id == id)
    }

    pub fn find_scheduled(&self, id: &str) -> Option<&ScheduledSurgery> {
        self.scheduled.iter().find(|surgery| surgery.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_pending(id).is_some() || self.find_scheduled(id).is_some()
    }

    pub fn lifecycle(&self, id: &str) -> Option<RecordLifecycle> {
        self.lifecycle.get(id).copied()
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.filter(|id| self.contains(id)).map(str::to_string);
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Scheduled surgeries whose UTC day equals `date`; bad timestamps are skipped
    pub fn surgeries_for_date(&self, date: NaiveDate) -> Vec<&ScheduledSurgery> {
        self.scheduled
            .iter()
            .filter(|surgery| {
                scheduled_start(surgery.scheduled_date.as_deref())
                    .is_some_and(|(day, _)| day == date)
            })
            .collect()
    }

    /// Room-blocking bookings in one room on one day, optionally excluding a record
    pub fn bookings_for<'a>(
        &'a self,
        date: NaiveDate,
        room: &str,
        exclude: Option<&str>,
    ) -> Vec<(&'a str, TimeSpan)> {
        self.surgeries_for_date(date)
            .into_iter()
            .filter(|surgery| surgery.status.blocks_room())
            .filter(|surgery| surgery.operating_room == room)
            .filter(|surgery| exclude != Some(surgery.id()))
            .filter_map(|surgery| booked_span(surgery).map(|span| (surgery.id(), span)))
            .collect()
    }

    /// Id of the first booking overlapping `span`, if any
    pub fn conflict_for(
        &self,
        date: NaiveDate,
        room: &str,
        span: TimeSpan,
        exclude: Option<&str>,
    ) -> Option<String> {
        find_conflict(span, self.bookings_for(date, room, exclude)).map(str::to_string)
    }

    /// Surgery occupying `minute` in `room` on `date`
    pub fn occupant_at(&self, date: NaiveDate, room: &str, minute: u32) -> Option<&ScheduledSurgery> {
        self.surgeries_for_date(date).into_iter().find(|surgery| {
            surgery.operating_room == room
                && booked_span(surgery).is_some_and(|span| span.contains_minute(minute))
        })
    }

    /// Fresh id for a record that only exists locally
    pub fn next_placeholder_id(&mut self) -> String {
        self.next_local_id += 1;
        format!("{}{}", LOCAL_ID_PREFIX, self.next_local_id)
    }

    /// Apply a change locally before the server has answered
    pub fn apply_optimistic(&mut self, change: &ScheduleChange) -> RollbackPoint {
        let id = change.id().to_string();
        let point = self.snapshot(&id);

        match change {
            ScheduleChange::Schedule { surgery, slot } => {
                self.remove_pending(&id);
                self.scheduled.push(surgery.clone().into_scheduled(
                    slot.operating_room.clone(),
                    slot.scheduled_at.clone(),
                    SurgeryStatus::Scheduled,
                ));
            }
            ScheduleChange::Move { surgery, slot } => {
                let mut moved = surgery.clone();
                moved.operating_room = slot.operating_room.clone();
                moved.scheduled_date = Some(slot.scheduled_at.clone());
                self.upsert_scheduled(moved);
            }
            ScheduleChange::Unschedule { surgery } => {
                self.remove_scheduled(&id);
                self.pending.push(surgery.to_pending());
            }
            ScheduleChange::EditPending { after, .. } => {
                if let Some(slot) = self.pending.iter_mut().find(|item| item.id == id) {
                    *slot = after.clone();
                }
            }
            ScheduleChange::EditScheduled { after, .. } => {
                self.upsert_scheduled(after.clone());
            }
            ScheduleChange::Create { preview, .. } => {
                self.pending.push(preview.clone());
            }
        }

        let state = match change {
            ScheduleChange::Create { .. } => RecordLifecycle::LocalOnly,
            _ => RecordLifecycle::PendingConfirmation,
        };
        self.lifecycle.insert(id, state);
        point
    }

    /// Fold the server's answer into the optimistic record
    pub fn confirm(&mut self, change: &ScheduleChange, outcome: ChangeOutcome) {
        let id = change.id().to_string();
        let server = outcome.primary.as_ref();

        match change {
            ScheduleChange::Schedule { .. } => {
                if let Some(local) = self.find_scheduled(&id).cloned() {
                    let mut merged = merge_scheduled(&local, server);
                    merged.status = outcome.status.unwrap_or(SurgeryStatus::Scheduled);
                    self.upsert_scheduled(merged);
                }
            }
            ScheduleChange::Move { .. } | ScheduleChange::EditScheduled { .. } => {
                if let Some(local) = self.find_scheduled(&id).cloned() {
                    self.upsert_scheduled(merge_scheduled(&local, server));
                }
            }
            ScheduleChange::EditPending { .. } => {
                if let Some(item) = self.pending.iter_mut().find(|item| item.id == id) {
                    *item = merge_pending(item, server);
                }
            }
            ScheduleChange::Unschedule { .. } => {}
            ScheduleChange::Create { .. } => {
                if let Some(item) = self.pending.iter_mut().find(|item| item.id == id) {
                    *item = merge_pending(item, server);
                    let confirmed_id = item.id.clone();
                    self.lifecycle.remove(&id);
                    if self.selected.as_deref() == Some(id.as_str()) {
                        self.selected = Some(confirmed_id.clone());
                    }
                    self.lifecycle
                        .insert(confirmed_id, RecordLifecycle::Confirmed);
                    return;
                }
            }
        }

        self.lifecycle.insert(id, RecordLifecycle::Confirmed);
    }

    /// Restore the collections to how they were before the change
    pub fn rollback(&mut self, point: RollbackPoint) {
        self.remove_pending(&point.id);
        self.remove_scheduled(&point.id);

        if let Some((index, surgery)) = point.pending {
            let index = index.min(self.pending.len());
            self.pending.insert(index, surgery);
        }
        if let Some((index, surgery)) = point.scheduled {
            let index = index.min(self.scheduled.len());
            self.scheduled.insert(index, surgery);
        }

        match point.lifecycle {
            Some(state) => {
                self.lifecycle.insert(point.id.clone(), state);
            }
            None => {
                self.lifecycle.remove(&point.id);
            }
        }
        self.selected = point.selected.filter(|id| self.contains(id));
    }

    fn snapshot(&self, id: &str) -> RollbackPoint {
        RollbackPoint {
            id: id.to_string(),
            pending: self
                .pending
                .iter()
                .position(|surgery| surgery.id == id)
                .map(|index| (index, self.pending[index].clone())),
            scheduled: self
                .scheduled
                .iter()
                .position(|surgery| surgery.id() == id)
                .map(|index| (index, self.scheduled[index].clone())),
            lifecycle: self.lifecycle(id),
            selected: self.selected.clone(),
        }
    }

    fn remove_pending(&mut self, id: &str) {
        self.pending.retain(|surgery| surgery.id != id);
    }

    fn remove_scheduled(&mut self, id: &str) {
        self.scheduled.retain(|surgery| surgery.id() != id);
    }

    fn upsert_scheduled(&mut self, surgery: ScheduledSurgery) {
        match self
            .scheduled
            .iter_mut()
            .find(|item| item.id() == surgery.id())
        {
            Some(slot) => *slot = surgery,
            None => self.scheduled.push(surgery),
        }
    }
}

/// Prefix of ids handed out by [`ScheduleStore::next_placeholder_id`]
pub const LOCAL_ID_PREFIX: &str = "local-";
