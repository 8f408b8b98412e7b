//! Small controls shared by several screens.

use egui::RichText;

use super::palette::{ERROR_TEXT, SUCCESS_TEXT};
use crate::models::pagination::Pagination;
use crate::models::surgery::Priority;
use crate::scheduling::edit::{HOUR_OPTIONS, MINUTE_OPTIONS};

pub fn error_text(ui: &mut egui::Ui, message: &str) {
    ui.label(RichText::new(message).color(ERROR_TEXT));
}

pub fn success_text(ui: &mut egui::Ui, message: &str) {
    ui.label(RichText::new(message).color(SUCCESS_TEXT));
}

/// Inline message under a form field
pub fn field_error(ui: &mut egui::Ui, message: Option<&String>) {
    if let Some(message) = message {
        ui.label(RichText::new(message).small().color(ERROR_TEXT));
    }
}

/// Previous / next controls; returns the page the user asked for
pub fn pagination_controls(ui: &mut egui::Ui, pagination: &Pagination) -> Option<u32> {
    let mut requested = None;
    ui.horizontal(|ui| {
        if ui
            .add_enabled(pagination.has_prev, egui::Button::new("◀ Anterior"))
            .clicked()
        {
            requested = Some(pagination.page.saturating_sub(1).max(1));
        }

        ui.label(format!(
            "Página {} de {} ({} registros)",
            pagination.page,
            pagination.total_pages.max(1),
            pagination.total
        ));

        if ui
            .add_enabled(pagination.has_next, egui::Button::new("Siguiente ▶"))
            .clicked()
        {
            requested = Some(pagination.page + 1);
        }
    });
    requested
}

/// Hours (1-8) and quarter-hour minutes
pub fn duration_picker(ui: &mut egui::Ui, id: &str, hours: &mut u32, minutes: &mut u32) {
    ui.horizontal(|ui| {
        egui::ComboBox::from_id_source((id, "hours"))
            .selected_text(format!("{} h", hours))
            .width(70.0)
            .show_ui(ui, |ui| {
                for option in HOUR_OPTIONS {
                    ui.selectable_value(hours, option, format!("{} h", option));
                }
            });
        egui::ComboBox::from_id_source((id, "minutes"))
            .selected_text(format!("{} min", minutes))
            .width(80.0)
            .show_ui(ui, |ui| {
                for option in MINUTE_OPTIONS {
                    ui.selectable_value(minutes, option, format!("{} min", option));
                }
            });
    });
}

pub fn priority_picker(ui: &mut egui::Ui, id: &str, priority: &mut Priority) {
    egui::ComboBox::from_id_source((id, "priority"))
        .selected_text(priority.label())
        .show_ui(ui, |ui| {
            for option in Priority::ALL {
                ui.selectable_value(priority, option, option.label());
            }
        });
}

/// Centered card used by the signed-out screens
pub fn centered_card<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
    let width = 380.0_f32.min(ui.available_width());
    ui.vertical_centered(|ui| {
        ui.add_space((ui.available_height() * 0.15).max(20.0));
        egui::Frame::group(ui.style())
            .inner_margin(egui::Margin::same(20.0))
            .show(ui, |ui| {
                ui.set_width(width);
                add_contents(ui)
            })
            .inner
    })
    .inner
}
