use egui::Color32;

use crate::models::surgery::{Priority, SurgeryStatus};

pub(crate) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(crate) fn priority_color(priority: Priority) -> Color32 {
    match priority {
        Priority::Low => Color32::from_rgb(76, 175, 80),
        Priority::Medium => Color32::from_rgb(66, 133, 244),
        Priority::High => Color32::from_rgb(255, 152, 0),
        Priority::Urgent => Color32::from_rgb(229, 57, 53),
    }
}

pub(crate) fn status_color(status: SurgeryStatus) -> Color32 {
    match status {
        SurgeryStatus::Pending => Color32::from_rgb(158, 158, 158),
        SurgeryStatus::Scheduled => Color32::from_rgb(66, 133, 244),
        SurgeryStatus::InProgress => Color32::from_rgb(255, 152, 0),
        SurgeryStatus::Completed => Color32::from_rgb(76, 175, 80),
        SurgeryStatus::Cancelled => Color32::from_rgb(229, 57, 53),
    }
}

/// Ghost shown under the pointer while dragging over the grid
pub(crate) fn drop_preview_color(conflicting: bool) -> Color32 {
    if conflicting {
        with_alpha(Color32::from_rgb(229, 57, 53), 90)
    } else {
        with_alpha(Color32::from_rgb(76, 175, 80), 90)
    }
}

pub(crate) const ERROR_TEXT: Color32 = Color32::from_rgb(200, 50, 50);
pub(crate) const SUCCESS_TEXT: Color32 = Color32::from_rgb(40, 140, 60);
