//! Surgery scheduling core.
//!
//! Everything here is synchronous and UI-agnostic: the egui layer plans a
//! [`change::ScheduleChange`], applies it optimistically to the
//! [`store::ScheduleStore`], runs [`change::execute_change`] off the UI thread
//! and then confirms or rolls back.

pub mod change;
pub mod conflict;
pub mod controller;
pub mod edit;
pub mod geometry;
pub mod reconcile;
pub mod store;

pub use change::{commit_change, execute_change, ChangeOutcome, ScheduleChange, Slot};
pub use conflict::{find_conflict, has_conflict, TimeSpan};
pub use controller::{DragController, DragState};
pub use edit::{CreateForm, EditBuffer, MIN_DURATION_MINUTES};
pub use geometry::{minutes_to_time, time_to_minutes, GridGeometry, TimeFormatError};
pub use reconcile::RecordLifecycle;
pub use store::{RollbackPoint, ScheduleStore};

use thiserror::Error;

use crate::services::api::ApiError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("Este horario ya está ocupado o se superpone con otra cirugía")]
    Conflict { conflicting_id: String },

    #[error("No hay ninguna cirugía en arrastre")]
    NothingDragged,

    #[error("Pabellón desconocido: {0}")]
    UnknownRoom(String),

    #[error("La duración mínima de una cirugía es de 1 hora")]
    DurationTooShort { minutes: u32 },

    #[error("Debe indicar fecha y hora para una cirugía programada")]
    MissingDateTime,

    #[error("Hora inválida: {0}")]
    InvalidTime(#[from] TimeFormatError),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The schedule fields were written but the status change was refused
    #[error("{error}{}", partial_suffix(.compensated))]
    StatusUpdateFailed { error: ApiError, compensated: bool },
}

fn partial_suffix(compensated: &bool) -> &'static str {
    if *compensated {
        ""
    } else {
        " (no se pudo revertir la asignación en el servidor)"
    }
}

impl ScheduleError {
    /// Rejected locally; no request was sent
    pub fn is_client_side(&self) -> bool {
        !matches!(
            self,
            ScheduleError::Api(_) | ScheduleError::StatusUpdateFailed { .. }
        )
    }
}
