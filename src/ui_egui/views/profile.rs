//! The signed-in user's own account.

use egui::RichText;

use super::widgets::{error_text, success_text};
use crate::models::user::User;
use crate::services::auth::validate_new_password;

#[derive(Debug, Default)]
pub struct ProfileView {
    pub password: String,
    pub confirm_password: String,
    pub error: Option<String>,
    pub info: Option<String>,
    pub saving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    ChangePassword(String),
    Logout,
}

pub fn show(ui: &mut egui::Ui, view: &mut ProfileView, user: &User) -> Option<ProfileAction> {
    let mut action = None;

    ui.heading("Mi perfil");
    ui.separator();

    egui::Grid::new("profile_fields").num_columns(2).spacing([16.0, 6.0]).show(ui, |ui| {
        ui.label(RichText::new("Nombre").weak());
        ui.label(user.full_name());
        ui.end_row();
        ui.label(RichText::new("Email").weak());
        ui.label(&user.email);
        ui.end_row();
        ui.label(RichText::new("Rol").weak());
        ui.label(user.role.label());
        ui.end_row();
        ui.label(RichText::new("Teléfono").weak());
        ui.label(user.phone.as_deref().unwrap_or("-"));
        ui.end_row();
        ui.label(RichText::new("Email verificado").weak());
        ui.label(if user.email_verified { "Sí" } else { "No" });
        ui.end_row();
    });

    ui.add_space(16.0);
    ui.label(RichText::new("Cambiar contraseña").strong());
    ui.add(
        egui::TextEdit::singleline(&mut view.password)
            .password(true)
            .hint_text("Nueva contraseña"),
    );
    ui.add(
        egui::TextEdit::singleline(&mut view.confirm_password)
            .password(true)
            .hint_text("Confirmar contraseña"),
    );
    if let Some(error) = &view.error {
        error_text(ui, error);
    }
    if let Some(info) = &view.info {
        success_text(ui, info);
    }

    let label = if view.saving { "Guardando..." } else { "Actualizar contraseña" };
    if ui.add_enabled(!view.saving, egui::Button::new(label)).clicked() {
        match validate_new_password(&view.password, &view.confirm_password) {
            Ok(()) => {
                view.saving = true;
                view.error = None;
                view.info = None;
                action = Some(ProfileAction::ChangePassword(view.password.clone()));
            }
            Err(err) => view.error = Some(err.to_string()),
        }
    }

    ui.add_space(24.0);
    if ui.button("Cerrar sesión").clicked() {
        action = Some(ProfileAction::Logout);
    }
    action
}
