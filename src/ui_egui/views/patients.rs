//! Patient registry: searchable, paged table plus create/edit modal.

use egui::RichText;

use super::widgets::{error_text, field_error, pagination_controls};
use crate::models::pagination::Pagination;
use crate::models::patient::{Patient, PatientForm, PatientFormErrors, PatientQuery};

pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct PatientModal {
    /// `None` when creating
    pub editing_id: Option<String>,
    pub form: PatientForm,
    pub errors: PatientFormErrors,
    pub server_error: Option<String>,
    pub saving: bool,
}

impl PatientModal {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(patient: &Patient) -> Self {
        Self {
            editing_id: Some(patient.id.clone()),
            form: PatientForm::from_patient(patient),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct PatientsView {
    pub patients: Vec<Patient>,
    pub pagination: Pagination,
    pub search: String,
    pub page: u32,
    pub loading: bool,
    pub error: Option<String>,
    pub modal: Option<PatientModal>,
}

impl PatientsView {
    pub fn query(&self) -> PatientQuery {
        PatientQuery {
            page: Some(self.page.max(1)),
            limit: Some(PAGE_SIZE),
            search: Some(self.search.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientsAction {
    Load(PatientQuery),
    Save {
        form: PatientForm,
        existing_id: Option<String>,
    },
    Delete {
        id: String,
        name: String,
    },
}

pub fn show(ui: &mut egui::Ui, view: &mut PatientsView) -> Vec<PatientsAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.heading("Pacientes");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("+ Nuevo paciente").clicked() {
                view.modal = Some(PatientModal::create());
            }
        });
    });
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Buscar:");
        let search = ui.add(
            egui::TextEdit::singleline(&mut view.search)
                .hint_text("Nombre, RUT o email")
                .desired_width(260.0),
        );
        let submitted = search.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if submitted || ui.button("Buscar").clicked() {
            view.page = 1;
            actions.push(PatientsAction::Load(view.query()));
        }
        if view.loading {
            ui.spinner();
        }
    });

    if let Some(error) = &view.error {
        error_text(ui, error);
    }
    ui.add_space(6.0);

    egui::ScrollArea::vertical()
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui| {
            egui::Grid::new("patients_table")
                .num_columns(6)
                .striped(true)
                .spacing([16.0, 6.0])
                .show(ui, |ui| {
                    for header in ["Nombre", "RUT", "Email", "Teléfono", "Estado", ""] {
                        ui.label(RichText::new(header).strong());
                    }
                    ui.end_row();

                    for patient in &view.patients {
                        ui.label(&patient.full_name);
                        ui.label(&patient.rut);
                        ui.label(&patient.email);
                        ui.label(&patient.phone);
                        ui.label(if patient.is_active { "Activo" } else { "Inactivo" });
                        ui.horizontal(|ui| {
                            if ui.small_button("Editar").clicked() {
                                view.modal = Some(PatientModal::edit(patient));
                            }
                            if ui.small_button("Eliminar").clicked() {
                                actions.push(PatientsAction::Delete {
                                    id: patient.id.clone(),
                                    name: patient.full_name.clone(),
                                });
                            }
                        });
                        ui.end_row();
                    }
                });

            if view.patients.is_empty() && !view.loading {
                ui.label(RichText::new("No se encontraron pacientes").weak());
            }
        });

    if let Some(page) = pagination_controls(ui, &view.pagination) {
        view.page = page;
        actions.push(PatientsAction::Load(view.query()));
    }

    if let Some(action) = show_modal(ui.ctx(), &mut view.modal) {
        actions.push(action);
    }
    actions
}

fn show_modal(ctx: &egui::Context, modal: &mut Option<PatientModal>) -> Option<PatientsAction> {
    let state = modal.as_mut()?;
    let mut action = None;
    let mut close = false;
    let editing = state.editing_id.is_some();
    let title = if editing { "Editar paciente" } else { "Nuevo paciente" };

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.set_min_width(360.0);

            ui.label("Nombre completo");
            ui.text_edit_singleline(&mut state.form.full_name);
            field_error(ui, state.errors.full_name.as_ref());

            ui.label("RUT");
            ui.add_enabled(
                !editing,
                egui::TextEdit::singleline(&mut state.form.rut).hint_text("12345678-9"),
            );
            field_error(ui, state.errors.rut.as_ref());

            ui.label("Email");
            ui.add_enabled(!editing, egui::TextEdit::singleline(&mut state.form.email));
            field_error(ui, state.errors.email.as_ref());

            ui.label("Teléfono");
            ui.text_edit_singleline(&mut state.form.phone);
            field_error(ui, state.errors.phone.as_ref());

            if let Some(error) = &state.server_error {
                error_text(ui, error);
            }

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                let label = if state.saving { "Guardando..." } else { "Guardar" };
                if ui.add_enabled(!state.saving, egui::Button::new(label)).clicked() {
                    state.errors = state.form.validate();
                    if state.errors.is_empty() {
                        state.saving = true;
                        state.server_error = None;
                        action = Some(PatientsAction::Save {
                            form: state.form.clone(),
                            existing_id: state.editing_id.clone(),
                        });
                    }
                }
                if ui.button("Cancelar").clicked() {
                    close = true;
                }
            });
        });

    if close {
        *modal = None;
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_uses_first_page_by_default() {
        let view = PatientsView {
            search: "rojas".to_string(),
            ..PatientsView::default()
        };
        assert_eq!(
            view.query(),
            PatientQuery {
                page: Some(1),
                limit: Some(PAGE_SIZE),
                search: Some("rojas".to_string()),
            }
        );
    }

    #[test]
    fn test_edit_modal_prefills_form() {
        let patient: Patient = serde_json::from_str(
            r#"{"id": 9, "full_name": "Luis Soto", "rut": "12345678-9", "email": "luis@bak.cl", "phone": "+56 9 1234 5678"}"#,
        )
        .unwrap();
        let modal = PatientModal::edit(&patient);
        assert_eq!(modal.editing_id.as_deref(), Some("9"));
        assert_eq!(modal.form.rut, "12345678-9");
        assert!(!modal.saving);
    }
}
