//! Surgery scheduling page.
//!
//! Pending requests sit in the left column, the room grid fills the center and
//! the selected surgery is shown on the right. Dragging between them plans a
//! [`ScheduleChange`]; the app applies it optimistically and sends it to the
//! backend.

use chrono::NaiveDate;
use egui::{Id, RichText, Sense};
use egui_extras::DatePickerButton;

use super::palette::{priority_color, status_color, with_alpha};
use super::room_grid;
use super::widgets::{duration_picker, error_text, priority_picker};
use crate::models::settings::ScheduleConfig;
use crate::models::surgery::{PendingSurgery, ScheduledSurgery};
use crate::scheduling::edit::PlacementFields;
use crate::scheduling::store::derive_display_time;
use crate::scheduling::{
    CreateForm, DragController, DragState, EditBuffer, ScheduleChange, ScheduleError,
    ScheduleStore,
};
use crate::ui_egui::drag::{show_drag_badge, DropTarget, DropZones};
use crate::utils::date::{format_datetime_es, format_long_date_es};

const PENDING_PANEL_WIDTH: f32 = 240.0;
const DETAIL_PANEL_WIDTH: f32 = 300.0;

/// Something the create form can pick from: `(id, label)`
pub type PickOption = (String, String);

pub struct ScheduleView {
    pub store: ScheduleStore,
    pub controller: DragController,
    pub loading: bool,
    pub loaded: bool,
    pub error: Option<String>,
    pub edit: Option<EditBuffer>,
    pub edit_error: Option<String>,
    pub create: Option<CreateForm>,
    pub create_error: Option<String>,
    pub patient_options: Vec<PickOption>,
    pub doctor_options: Vec<PickOption>,
    zones: DropZones,
}

impl ScheduleView {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            store: ScheduleStore::new(),
            controller: DragController::from_config(config),
            loading: false,
            loaded: false,
            error: None,
            edit: None,
            edit_error: None,
            create: None,
            create_error: None,
            patient_options: Vec::new(),
            doctor_options: Vec::new(),
            zones: DropZones::default(),
        }
    }

    /// Close the editor if the record it was editing disappeared
    pub fn drop_stale_edit(&mut self) {
        if let Some(edit) = &self.edit {
            if !self.store.contains(&edit.id) {
                self.edit = None;
                self.edit_error = None;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleAction {
    Reload,
    LoadCreateOptions,
    Commit(ScheduleChange),
    Rejected(ScheduleError),
}

pub fn show(ui: &mut egui::Ui, view: &mut ScheduleView) -> Vec<ScheduleAction> {
    let mut actions = Vec::new();
    view.zones.clear();

    show_toolbar(ui, view, &mut actions);
    if let Some(error) = &view.error {
        error_text(ui, error);
    }
    ui.separator();

    egui::SidePanel::left("schedule_pending_panel")
        .resizable(false)
        .exact_width(PENDING_PANEL_WIDTH)
        .show_inside(ui, |ui| show_pending_column(ui, view));

    egui::SidePanel::right("schedule_detail_panel")
        .resizable(true)
        .default_width(DETAIL_PANEL_WIDTH)
        .show_inside(ui, |ui| show_detail_panel(ui, view, &mut actions));

    egui::CentralPanel::default().show_inside(ui, |ui| {
        room_grid::show(ui, &mut view.store, &mut view.controller, &mut view.zones);
    });

    resolve_drag(ui.ctx(), view, &mut actions);
    show_create_dialog(ui.ctx(), view, &mut actions);
    actions
}

fn show_toolbar(ui: &mut egui::Ui, view: &mut ScheduleView, actions: &mut Vec<ScheduleAction>) {
    ui.horizontal(|ui| {
        ui.heading("Programación de cirugías");
        ui.add_space(16.0);

        if ui.button("◀").on_hover_text("Día anterior").clicked() {
            view.controller.previous_day();
        }
        if ui.button("Hoy").clicked() {
            view.controller.go_to_today();
        }
        if ui.button("▶").on_hover_text("Día siguiente").clicked() {
            view.controller.next_day();
        }

        let mut date: NaiveDate = view.controller.visible_date();
        if ui
            .add(DatePickerButton::new(&mut date).id_source("schedule_date_picker"))
            .changed()
        {
            view.controller.set_visible_date(date);
        }
        ui.label(RichText::new(format_long_date_es(view.controller.visible_date())).strong());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("+ Nueva cirugía").clicked() {
                view.create = Some(CreateForm::default());
                view.create_error = None;
                actions.push(ScheduleAction::LoadCreateOptions);
            }
            if ui.add_enabled(!view.loading, egui::Button::new("⟳")).on_hover_text("Recargar").clicked() {
                actions.push(ScheduleAction::Reload);
            }
            if view.loading {
                ui.spinner();
            }
        });
    });
}

fn show_pending_column(ui: &mut egui::Ui, view: &mut ScheduleView) {
    ui.label(RichText::new(format!("Pendientes ({})", view.store.pending().len())).strong());
    ui.add_space(4.0);

    let receiving = matches!(view.controller.state(), DragState::DraggingScheduled(_));
    let pending: Vec<PendingSurgery> = view.store.pending().to_vec();

    let area = egui::ScrollArea::vertical()
        .id_source("schedule_pending_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if pending.is_empty() {
                ui.label(RichText::new("Sin cirugías pendientes").weak());
            }
            for surgery in &pending {
                pending_card(ui, view, surgery);
                ui.add_space(4.0);
            }
        });

    view.zones.register_pending(area.inner_rect);
    if receiving {
        ui.painter().rect_stroke(
            area.inner_rect,
            4.0,
            egui::Stroke::new(2.0, ui.visuals().selection.stroke.color),
        );
    }
}

fn pending_card(ui: &mut egui::Ui, view: &mut ScheduleView, surgery: &PendingSurgery) {
    let in_flight = view
        .store
        .lifecycle(&surgery.id)
        .is_some_and(|lifecycle| lifecycle.is_in_flight());
    let selected = view.store.selected_id() == Some(surgery.id.as_str());
    let dragged = view.controller.state().dragged_id() == Some(surgery.id.as_str());
    let accent = priority_color(surgery.priority);

    let mut frame = egui::Frame::group(ui.style()).fill(with_alpha(accent, if dragged { 20 } else { 45 }));
    if selected {
        frame = frame.stroke(egui::Stroke::new(2.0, ui.visuals().selection.stroke.color));
    }

    let card = frame.show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(RichText::new(surgery.priority.label()).small().color(accent));
            if in_flight {
                ui.spinner();
            }
        });
        ui.label(RichText::new(&surgery.patient_name).strong());
        ui.label(&surgery.surgery_type);
        ui.label(RichText::new(format!("{} · {}", surgery.doctor_name, surgery.duration_label())).small());
    });

    let response = ui.interact(
        card.response.rect,
        Id::new(("pending_card", &surgery.id)),
        Sense::click_and_drag(),
    );
    if response.drag_started() && !in_flight {
        view.controller.begin_pending_drag(surgery.clone());
    } else if response.clicked() {
        view.store.select(Some(surgery.id.as_str()));
    }
    if response.hovered() && !in_flight {
        ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::Grab);
    }
}

/// Resolve a released drag against the zones registered this frame
fn resolve_drag(ctx: &egui::Context, view: &mut ScheduleView, actions: &mut Vec<ScheduleAction>) {
    if !view.controller.is_dragging() {
        return;
    }

    let (released, down, pointer) = ctx.input(|i| {
        (
            i.pointer.any_released(),
            i.pointer.any_down(),
            i.pointer.interact_pos(),
        )
    });

    if let Some(pos) = pointer.filter(|_| down) {
        ctx.output_mut(|o| o.cursor_icon = egui::CursorIcon::Grabbing);
        let label = match view.controller.state() {
            DragState::DraggingPending(surgery) => surgery.patient_name.clone(),
            DragState::DraggingScheduled(surgery) => surgery.surgery.patient_name.clone(),
            DragState::Idle => String::new(),
        };
        show_drag_badge(ctx, pos, &label);
    }

    if !released {
        if !down {
            view.controller.abandon();
        }
        return;
    }

    let target = pointer.map_or(DropTarget::Outside, |pos| view.zones.target_at(pos));
    let planned = match target {
        DropTarget::Room { room, offset_y } => view
            .controller
            .plan_grid_drop(&view.store, &room, offset_y)
            .map(Some),
        DropTarget::PendingList => view.controller.plan_pending_drop(),
        DropTarget::Outside => Ok(None),
    };
    view.controller.finish();

    match planned {
        Ok(Some(change)) => actions.push(ScheduleAction::Commit(change)),
        Ok(None) => {}
        Err(error) => actions.push(ScheduleAction::Rejected(error)),
    }
}

fn show_detail_panel(ui: &mut egui::Ui, view: &mut ScheduleView, actions: &mut Vec<ScheduleAction>) {
    if view.edit.is_some() {
        show_edit_form(ui, view, actions);
        return;
    }

    let Some(selected) = view.store.selected_id().map(str::to_string) else {
        ui.label(RichText::new("Seleccione una cirugía para ver el detalle").weak());
        return;
    };

    let in_flight = view
        .store
        .lifecycle(&selected)
        .is_some_and(|lifecycle| lifecycle.is_in_flight());

    if let Some(surgery) = view.store.find_pending(&selected).cloned() {
        ui.heading("Cirugía pendiente");
        surgery_fields(ui, &surgery);
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(!in_flight, egui::Button::new("Editar")).clicked() {
                view.edit = Some(EditBuffer::for_pending(&surgery));
                view.edit_error = None;
            }
            if ui.button("Cerrar").clicked() {
                view.store.select(None);
            }
        });
    } else if let Some(surgery) = view.store.find_scheduled(&selected).cloned() {
        ui.heading("Cirugía programada");
        surgery_fields(ui, &surgery.surgery);
        placement_fields(ui, &surgery);
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(!in_flight, egui::Button::new("Editar")).clicked() {
                view.edit = Some(EditBuffer::for_scheduled(&surgery));
                view.edit_error = None;
            }
            if ui
                .add_enabled(!in_flight, egui::Button::new("Devolver a pendientes"))
                .clicked()
            {
                actions.push(ScheduleAction::Commit(ScheduleChange::Unschedule {
                    surgery: surgery.clone(),
                }));
            }
            if ui.button("Cerrar").clicked() {
                view.store.select(None);
            }
        });
    } else {
        view.store.select(None);
        return;
    }

    if in_flight {
        ui.label(RichText::new("Guardando cambios...").weak());
    }
}

fn surgery_fields(ui: &mut egui::Ui, surgery: &PendingSurgery) {
    egui::Grid::new("schedule_detail_fields")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label(RichText::new("Paciente").weak());
            ui.label(&surgery.patient_name);
            ui.end_row();
            ui.label(RichText::new("Tipo").weak());
            ui.label(&surgery.surgery_type);
            ui.end_row();
            ui.label(RichText::new("Médico").weak());
            ui.label(&surgery.doctor_name);
            ui.end_row();
            ui.label(RichText::new("Duración").weak());
            ui.label(surgery.duration_label());
            ui.end_row();
            ui.label(RichText::new("Prioridad").weak());
            ui.label(RichText::new(surgery.priority.label()).color(priority_color(surgery.priority)));
            ui.end_row();
            ui.label(RichText::new("Anestesia").weak());
            ui.label(surgery.anesthesia_type.as_deref().unwrap_or("-"));
            ui.end_row();
            ui.label(RichText::new("Notas").weak());
            ui.label(surgery.pre_surgery_notes.as_deref().unwrap_or("-"));
            ui.end_row();
        });
}

fn placement_fields(ui: &mut egui::Ui, surgery: &ScheduledSurgery) {
    egui::Grid::new("schedule_detail_placement")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label(RichText::new("Pabellón").weak());
            ui.label(&surgery.operating_room);
            ui.end_row();
            ui.label(RichText::new("Inicio").weak());
            ui.label(
                surgery
                    .scheduled_date
                    .as_deref()
                    .map_or_else(|| "-".to_string(), format_datetime_es),
            );
            ui.end_row();
            ui.label(RichText::new("Hora").weak());
            ui.label(derive_display_time(surgery.scheduled_date.as_deref()));
            ui.end_row();
            ui.label(RichText::new("Estado").weak());
            ui.label(RichText::new(surgery.status.label()).color(status_color(surgery.status)));
            ui.end_row();
        });
}

fn show_edit_form(ui: &mut egui::Ui, view: &mut ScheduleView, actions: &mut Vec<ScheduleAction>) {
    let rooms = view.controller.rooms().to_vec();
    let Some(edit) = view.edit.as_mut() else {
        return;
    };

    ui.heading("Editar cirugía");
    ui.label("Tipo de cirugía");
    ui.text_edit_singleline(&mut edit.surgery_type);
    ui.label("Duración");
    duration_picker(ui, "edit_duration", &mut edit.hours, &mut edit.minutes);
    ui.label("Prioridad");
    priority_picker(ui, "edit_priority", &mut edit.priority);
    ui.label("Tipo de anestesia");
    ui.text_edit_singleline(&mut edit.anesthesia_type);
    ui.label("Notas prequirúrgicas");
    ui.text_edit_multiline(&mut edit.pre_surgery_notes);

    if let Some(placement) = edit.placement.as_mut() {
        placement_editor(ui, placement, &rooms);
    }

    if let Some(error) = &view.edit_error {
        error_text(ui, error);
    }

    let mut save = false;
    let mut cancel = false;
    ui.add_space(8.0);
    ui.horizontal(|ui| {
        save = ui.button("Guardar").clicked();
        cancel = ui.button("Cancelar").clicked();
    });

    if cancel {
        view.edit = None;
        view.edit_error = None;
    } else if save {
        let planned = view.edit.as_ref().map(|edit| edit.to_change(&view.store));
        match planned {
            Some(Ok(change)) => {
                view.edit = None;
                view.edit_error = None;
                actions.push(ScheduleAction::Commit(change));
            }
            Some(Err(error)) => view.edit_error = Some(error.to_string()),
            None => {}
        }
    }
}

fn placement_editor(ui: &mut egui::Ui, placement: &mut PlacementFields, rooms: &[String]) {
    ui.label("Pabellón");
    egui::ComboBox::from_id_source("edit_room")
        .selected_text(placement.operating_room.as_str())
        .show_ui(ui, |ui| {
            for room in rooms {
                ui.selectable_value(&mut placement.operating_room, room.clone(), room.as_str());
            }
        });

    ui.label("Fecha");
    ui.horizontal(|ui| {
        let mut date = placement.date.unwrap_or_else(|| chrono::Utc::now().date_naive());
        if ui
            .add(DatePickerButton::new(&mut date).id_source("edit_date"))
            .changed()
            || (placement.date.is_none() && ui.small_button("Usar fecha").clicked())
        {
            placement.date = Some(date);
        }
    });

    ui.label("Hora (HH:MM)");
    ui.add(egui::TextEdit::singleline(&mut placement.time).hint_text("08:00").desired_width(80.0));
}

fn pick_combo(ui: &mut egui::Ui, id: &str, options: &[PickOption], id_value: &mut String, label: &mut String) {
    let selected = if label.is_empty() { "Seleccionar..." } else { label.as_str() };
    let mut chosen: Option<&PickOption> = None;
    egui::ComboBox::from_id_source(id)
        .selected_text(selected.to_string())
        .width(240.0)
        .show_ui(ui, |ui| {
            for option in options {
                if ui.selectable_label(*id_value == option.0, option.1.as_str()).clicked() {
                    chosen = Some(option);
                }
            }
        });
    if let Some((id, name)) = chosen {
        *id_value = id.clone();
        *label = name.clone();
    }
}

fn show_create_dialog(ctx: &egui::Context, view: &mut ScheduleView, actions: &mut Vec<ScheduleAction>) {
    let Some(form) = view.create.as_mut() else {
        return;
    };
    let mut submit = false;
    let mut close = false;

    egui::Window::new("Nueva cirugía")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Grid::new("create_surgery_fields")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Paciente");
                    pick_combo(
                        ui,
                        "create_patient",
                        &view.patient_options,
                        &mut form.patient_id,
                        &mut form.patient_name,
                    );
                    ui.end_row();
                    ui.label("Médico");
                    pick_combo(
                        ui,
                        "create_doctor",
                        &view.doctor_options,
                        &mut form.doctor_id,
                        &mut form.doctor_name,
                    );
                    ui.end_row();
                    ui.label("Tipo de cirugía");
                    ui.text_edit_singleline(&mut form.surgery_type);
                    ui.end_row();
                    ui.label("Duración");
                    duration_picker(ui, "create_duration", &mut form.hours, &mut form.minutes);
                    ui.end_row();
                    ui.label("Prioridad");
                    priority_picker(ui, "create_priority", &mut form.priority);
                    ui.end_row();
                    ui.label("Anestesia");
                    ui.text_edit_singleline(&mut form.anesthesia_type);
                    ui.end_row();
                    ui.label("Notas");
                    ui.text_edit_multiline(&mut form.pre_surgery_notes);
                    ui.end_row();
                });

            if view.patient_options.is_empty() || view.doctor_options.is_empty() {
                ui.label(RichText::new("Cargando pacientes y médicos...").weak());
            }
            if let Some(error) = &view.create_error {
                error_text(ui, error);
            }

            ui.horizontal(|ui| {
                submit = ui.button("Crear").clicked();
                close = ui.button("Cancelar").clicked();
            });
        });

    if close {
        view.create = None;
        view.create_error = None;
        return;
    }
    if !submit {
        return;
    }

    let planned = view.create.as_ref().map(|form| form.to_change(&mut view.store));
    match planned {
        Some(Ok(change)) => {
            view.create = None;
            view.create_error = None;
            actions.push(ScheduleAction::Commit(change));
        }
        Some(Err(error)) => view.create_error = Some(error.to_string()),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::surgery::SurgeryRecord;

    fn record(id: &str) -> SurgeryRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "patient_name": "Ana Rojas",
            "surgery_type": "Apendicectomía",
            "estimated_duration": 60,
            "status": "pending",
            "priority": "medium"
        }))
        .unwrap()
    }

    #[test]
    fn test_stale_edit_is_dropped() {
        let mut view = ScheduleView::new(&ScheduleConfig::default());
        view.store.replace_pending(&[record("1")]);
        view.edit = view.store.find_pending("1").map(EditBuffer::for_pending);

        view.drop_stale_edit();
        assert!(view.edit.is_some());

        view.store.replace_pending(&[]);
        view.drop_stale_edit();
        assert!(view.edit.is_none());
    }

    #[test]
    fn test_new_view_starts_unloaded() {
        let view = ScheduleView::new(&ScheduleConfig::default());
        assert!(!view.loaded);
        assert!(view.store.pending().is_empty());
        assert_eq!(view.controller.rooms().len(), ScheduleConfig::default().operating_rooms.len());
    }
}
