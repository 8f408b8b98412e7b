//! Confirmation dialog for destructive actions.

use egui::{Context, RichText};

use super::ClinicApp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeletePatient { id: String, name: String },
    DeleteUser { id: String, name: String },
    SetUserActive { id: String, name: String, active: bool },
    Logout,
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmAction::DeletePatient { .. } => "Eliminar paciente",
            ConfirmAction::DeleteUser { .. } => "Eliminar usuario",
            ConfirmAction::SetUserActive { active: true, .. } => "Activar usuario",
            ConfirmAction::SetUserActive { active: false, .. } => "Desactivar usuario",
            ConfirmAction::Logout => "Cerrar sesión",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfirmAction::DeletePatient { name, .. } => format!(
                "¿Está seguro de eliminar al paciente \"{}\"?\n\nEsta acción no se puede deshacer.",
                name
            ),
            ConfirmAction::DeleteUser { name, .. } => format!(
                "¿Está seguro de eliminar al usuario \"{}\"?\n\nEsta acción no se puede deshacer.",
                name
            ),
            ConfirmAction::SetUserActive { name, active, .. } => format!(
                "¿Está seguro de {} al usuario \"{}\"?",
                if *active { "activar" } else { "desactivar" },
                name
            ),
            ConfirmAction::Logout => "¿Desea cerrar la sesión?".to_string(),
        }
    }

    pub fn confirm_text(&self) -> &'static str {
        match self {
            ConfirmAction::DeletePatient { .. } | ConfirmAction::DeleteUser { .. } => "Eliminar",
            ConfirmAction::SetUserActive { active: true, .. } => "Activar",
            ConfirmAction::SetUserActive { active: false, .. } => "Desactivar",
            ConfirmAction::Logout => "Cerrar sesión",
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            ConfirmAction::DeletePatient { .. }
                | ConfirmAction::DeleteUser { .. }
                | ConfirmAction::SetUserActive { active: false, .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Confirmed,
    Cancelled,
    Pending,
}

#[derive(Debug, Default)]
pub struct ConfirmDialogState {
    pending_action: Option<ConfirmAction>,
}

impl ConfirmDialogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, action: ConfirmAction) {
        self.pending_action = Some(action);
    }

    pub fn is_open(&self) -> bool {
        self.pending_action.is_some()
    }

    /// Render the dialog; a confirmed action stays available through [`Self::take_action`]
    pub fn render(&mut self, ctx: &Context) -> ConfirmResult {
        let Some(action) = &self.pending_action else {
            return ConfirmResult::Pending;
        };

        let mut result = ConfirmResult::Pending;

        egui::Window::new(action.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(300.0);
                ui.set_max_width(420.0);
                ui.add_space(10.0);

                if action.is_destructive() {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("⚠").size(24.0).color(egui::Color32::from_rgb(220, 150, 50)));
                        ui.label(action.message());
                    });
                } else {
                    ui.label(action.message());
                }

                ui.add_space(15.0);
                ui.separator();
                ui.add_space(10.0);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let confirm_button = if action.is_destructive() {
                        egui::Button::new(RichText::new(action.confirm_text()).color(egui::Color32::WHITE))
                            .fill(egui::Color32::from_rgb(180, 60, 60))
                    } else {
                        egui::Button::new(action.confirm_text())
                    };

                    if ui.add(confirm_button).clicked() {
                        result = ConfirmResult::Confirmed;
                    }

                    ui.add_space(10.0);

                    if ui.button("Cancelar").clicked() {
                        result = ConfirmResult::Cancelled;
                    }
                });
                ui.add_space(5.0);
            });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            result = ConfirmResult::Cancelled;
        }

        if result == ConfirmResult::Cancelled {
            self.pending_action = None;
        }
        result
    }

    pub fn take_action(&mut self) -> Option<ConfirmAction> {
        self.pending_action.take()
    }
}

impl ClinicApp {
    pub(super) fn handle_confirm_dialog(&mut self, ctx: &Context) {
        if self.confirm_dialog.render(ctx) != ConfirmResult::Confirmed {
            return;
        }

        let Some(action) = self.confirm_dialog.take_action() else {
            return;
        };

        match action {
            ConfirmAction::DeletePatient { id, name } => self.delete_patient(id, name),
            ConfirmAction::DeleteUser { id, name } => self.delete_user(id, name),
            ConfirmAction::SetUserActive { id, name, active } => {
                self.set_user_active(id, name, active)
            }
            ConfirmAction::Logout => self.logout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deactivation_is_destructive_activation_is_not() {
        let deactivate = ConfirmAction::SetUserActive {
            id: "3".to_string(),
            name: "Ana Rojas".to_string(),
            active: false,
        };
        let activate = ConfirmAction::SetUserActive {
            id: "3".to_string(),
            name: "Ana Rojas".to_string(),
            active: true,
        };
        assert!(deactivate.is_destructive());
        assert!(!activate.is_destructive());
        assert_eq!(activate.confirm_text(), "Activar");
        assert!(deactivate.message().contains("desactivar"));
    }

    #[test]
    fn test_take_action_closes_dialog() {
        let mut dialog = ConfirmDialogState::new();
        dialog.request(ConfirmAction::Logout);
        assert!(dialog.is_open());
        assert_eq!(dialog.take_action(), Some(ConfirmAction::Logout));
        assert!(!dialog.is_open());
    }
}
