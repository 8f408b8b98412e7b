//! Staff accounts: filters, paged table, create/edit dialog and password reset.

use egui::RichText;

use super::widgets::{error_text, pagination_controls};
use crate::models::pagination::Pagination;
use crate::models::patient::is_valid_email;
use crate::models::user::{CreateUserRequest, Role, UpdateUserRequest, User, UserQuery};
use crate::services::auth::validate_new_password;

pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDialog {
    pub editing_id: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub role: Role,
    pub password: String,
    pub error: Option<String>,
}

impl UserDialog {
    pub fn edit(user: &User) -> Self {
        Self {
            editing_id: Some(user.id.clone()),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            role: user.role,
            ..Self::default()
        }
    }

    fn optional_phone(&self) -> Option<String> {
        let phone = self.phone.trim();
        (!phone.is_empty()).then(|| phone.to_string())
    }

    /// Validate and build the request for this dialog
    pub fn to_action(&self) -> Result<UsersAction, String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("Nombre y apellido son requeridos".to_string());
        }

        match &self.editing_id {
            Some(id) => Ok(UsersAction::Update {
                id: id.clone(),
                request: UpdateUserRequest {
                    first_name: Some(self.first_name.trim().to_string()),
                    last_name: Some(self.last_name.trim().to_string()),
                    phone: self.optional_phone(),
                    role: Some(self.role),
                },
            }),
            None => {
                if !is_valid_email(self.email.trim()) {
                    return Err("Email inválido".to_string());
                }
                validate_new_password(&self.password, &self.password).map_err(|e| e.to_string())?;
                Ok(UsersAction::Create(CreateUserRequest {
                    email: self.email.trim().to_string(),
                    password: self.password.clone(),
                    first_name: self.first_name.trim().to_string(),
                    last_name: self.last_name.trim().to_string(),
                    phone: self.optional_phone(),
                    role: self.role,
                }))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordDialog {
    pub user_id: String,
    pub user_name: String,
    pub password: String,
    pub confirm_password: String,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct UsersView {
    pub users: Vec<User>,
    pub pagination: Pagination,
    pub page: u32,
    pub search: String,
    pub role_filter: Option<Role>,
    pub active_filter: Option<bool>,
    pub loading: bool,
    pub error: Option<String>,
    pub user_dialog: Option<UserDialog>,
    pub password_dialog: Option<PasswordDialog>,
}

impl UsersView {
    pub fn query(&self) -> UserQuery {
        UserQuery {
            page: Some(self.page.max(1)),
            limit: Some(PAGE_SIZE),
            role: self.role_filter,
            is_active: self.active_filter,
            search: Some(self.search.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsersAction {
    Load(UserQuery),
    Create(CreateUserRequest),
    Update { id: String, request: UpdateUserRequest },
    SetActive { id: String, name: String, active: bool },
    Delete { id: String, name: String },
    ChangePassword { id: String, password: String },
}

fn active_label(filter: Option<bool>) -> &'static str {
    match filter {
        None => "Todos",
        Some(true) => "Activos",
        Some(false) => "Inactivos",
    }
}

pub fn show(ui: &mut egui::Ui, view: &mut UsersView, current_user_id: Option<&str>) -> Vec<UsersAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.heading("Usuarios");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("+ Nuevo usuario").clicked() {
                view.user_dialog = Some(UserDialog::default());
            }
        });
    });
    ui.separator();

    let mut reload = false;
    ui.horizontal_wrapped(|ui| {
        ui.label("Buscar:");
        let search = ui.add(egui::TextEdit::singleline(&mut view.search).desired_width(200.0));
        reload |= search.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.label("Rol:");
        let before_role = view.role_filter;
        egui::ComboBox::from_id_source("users_role_filter")
            .selected_text(view.role_filter.map_or("Todos", |role| role.label()))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut view.role_filter, None, "Todos");
                for role in Role::ALL {
                    ui.selectable_value(&mut view.role_filter, Some(role), role.label());
                }
            });
        reload |= before_role != view.role_filter;

        ui.label("Estado:");
        let before_active = view.active_filter;
        egui::ComboBox::from_id_source("users_active_filter")
            .selected_text(active_label(view.active_filter))
            .show_ui(ui, |ui| {
                for option in [None, Some(true), Some(false)] {
                    ui.selectable_value(&mut view.active_filter, option, active_label(option));
                }
            });
        reload |= before_active != view.active_filter;

        reload |= ui.button("Buscar").clicked();
        if view.loading {
            ui.spinner();
        }
    });
    if reload {
        view.page = 1;
        actions.push(UsersAction::Load(view.query()));
    }

    if let Some(error) = &view.error {
        error_text(ui, error);
    }
    ui.add_space(6.0);

    egui::ScrollArea::vertical()
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui| {
            egui::Grid::new("users_table")
                .num_columns(6)
                .striped(true)
                .spacing([16.0, 6.0])
                .show(ui, |ui| {
                    for header in ["Nombre", "Email", "Rol", "Estado", "Último acceso", ""] {
                        ui.label(RichText::new(header).strong());
                    }
                    ui.end_row();

                    for user in &view.users {
                        let is_self = current_user_id == Some(user.id.as_str());
                        ui.label(user.full_name());
                        ui.label(&user.email);
                        ui.label(user.role.label());
                        ui.label(if user.is_active { "Activo" } else { "Inactivo" });
                        ui.label(user.last_login.as_deref().unwrap_or("-"));
                        ui.horizontal(|ui| {
                            if ui.small_button("Editar").clicked() {
                                view.user_dialog = Some(UserDialog::edit(user));
                            }
                            if ui.small_button("Contraseña").clicked() {
                                view.password_dialog = Some(PasswordDialog {
                                    user_id: user.id.clone(),
                                    user_name: user.full_name(),
                                    ..PasswordDialog::default()
                                });
                            }
                            let toggle = if user.is_active { "Desactivar" } else { "Activar" };
                            if ui.add_enabled(!is_self, egui::Button::new(toggle).small()).clicked() {
                                actions.push(UsersAction::SetActive {
                                    id: user.id.clone(),
                                    name: user.full_name(),
                                    active: !user.is_active,
                                });
                            }
                            if ui.add_enabled(!is_self, egui::Button::new("Eliminar").small()).clicked() {
                                actions.push(UsersAction::Delete {
                                    id: user.id.clone(),
                                    name: user.full_name(),
                                });
                            }
                        });
                        ui.end_row();
                    }
                });

            if view.users.is_empty() && !view.loading {
                ui.label(RichText::new("No se encontraron usuarios").weak());
            }
        });

    if let Some(page) = pagination_controls(ui, &view.pagination) {
        view.page = page;
        actions.push(UsersAction::Load(view.query()));
    }

    actions.extend(show_user_dialog(ui.ctx(), &mut view.user_dialog));
    actions.extend(show_password_dialog(ui.ctx(), &mut view.password_dialog));
    actions
}

fn show_user_dialog(ctx: &egui::Context, dialog: &mut Option<UserDialog>) -> Option<UsersAction> {
    let state = dialog.as_mut()?;
    let mut action = None;
    let mut close = false;
    let editing = state.editing_id.is_some();

    egui::Window::new(if editing { "Editar usuario" } else { "Nuevo usuario" })
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Grid::new("user_dialog_fields").num_columns(2).show(ui, |ui| {
                ui.label("Email");
                ui.add_enabled(!editing, egui::TextEdit::singleline(&mut state.email));
                ui.end_row();
                ui.label("Nombre");
                ui.text_edit_singleline(&mut state.first_name);
                ui.end_row();
                ui.label("Apellido");
                ui.text_edit_singleline(&mut state.last_name);
                ui.end_row();
                ui.label("Teléfono");
                ui.text_edit_singleline(&mut state.phone);
                ui.end_row();
                ui.label("Rol");
                egui::ComboBox::from_id_source("user_dialog_role")
                    .selected_text(state.role.label())
                    .show_ui(ui, |ui| {
                        for role in Role::ALL {
                            ui.selectable_value(&mut state.role, role, role.label());
                        }
                    });
                ui.end_row();
                if !editing {
                    ui.label("Contraseña");
                    ui.add(egui::TextEdit::singleline(&mut state.password).password(true));
                    ui.end_row();
                }
            });

            if let Some(error) = &state.error {
                error_text(ui, error);
            }

            ui.horizontal(|ui| {
                if ui.button("Guardar").clicked() {
                    match state.to_action() {
                        Ok(planned) => {
                            action = Some(planned);
                            close = true;
                        }
                        Err(message) => state.error = Some(message),
                    }
                }
                if ui.button("Cancelar").clicked() {
                    close = true;
                }
            });
        });

    if close {
        *dialog = None;
    }
    action
}

fn show_password_dialog(
    ctx: &egui::Context,
    dialog: &mut Option<PasswordDialog>,
) -> Option<UsersAction> {
    let state = dialog.as_mut()?;
    let mut action = None;
    let mut close = false;

    egui::Window::new("Cambiar contraseña")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!("Usuario: {}", state.user_name));
            ui.label("Nueva contraseña");
            ui.add(egui::TextEdit::singleline(&mut state.password).password(true));
            ui.label("Confirmar contraseña");
            ui.add(egui::TextEdit::singleline(&mut state.confirm_password).password(true));

            if let Some(error) = &state.error {
                error_text(ui, error);
            }

            ui.horizontal(|ui| {
                if ui.button("Actualizar").clicked() {
                    match validate_new_password(&state.password, &state.confirm_password) {
                        Ok(()) => {
                            action = Some(UsersAction::ChangePassword {
                                id: state.user_id.clone(),
                                password: state.password.clone(),
                            });
                            close = true;
                        }
                        Err(err) => state.error = Some(err.to_string()),
                    }
                }
                if ui.button("Cancelar").clicked() {
                    close = true;
                }
            });
        });

    if close {
        *dialog = None;
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_dialog() -> UserDialog {
        UserDialog {
            email: "medico@bak.cl".to_string(),
            first_name: "Pedro".to_string(),
            last_name: "Lagos".to_string(),
            role: Role::Doctor,
            password: "secreto1".to_string(),
            ..UserDialog::default()
        }
    }

    #[test]
    fn test_new_user_dialog_builds_create_request() {
        let action = filled_dialog().to_action().unwrap();
        let UsersAction::Create(request) = action else {
            panic!("expected create action");
        };
        assert_eq!(request.email, "medico@bak.cl");
        assert_eq!(request.phone, None);
    }

    #[test]
    fn test_new_user_requires_valid_email_and_password() {
        let mut dialog = filled_dialog();
        dialog.email = "no-email".to_string();
        assert_eq!(dialog.to_action(), Err("Email inválido".to_string()));

        let mut dialog = filled_dialog();
        dialog.password = "abc".to_string();
        assert!(dialog.to_action().is_err());
    }

    #[test]
    fn test_edit_dialog_builds_partial_update() {
        let mut dialog = filled_dialog();
        dialog.editing_id = Some("12".to_string());
        dialog.phone = " +56 2 2345 6789 ".to_string();

        let UsersAction::Update { id, request } = dialog.to_action().unwrap() else {
            panic!("expected update action");
        };
        assert_eq!(id, "12");
        assert_eq!(request.phone.as_deref(), Some("+56 2 2345 6789"));
        assert_eq!(request.role, Some(Role::Doctor));
    }

    #[test]
    fn test_query_carries_filters() {
        let view = UsersView {
            page: 3,
            role_filter: Some(Role::Admin),
            active_filter: Some(false),
            ..UsersView::default()
        };
        let query = view.query();
        assert_eq!(query.page, Some(3));
        assert_eq!(query.role, Some(Role::Admin));
        assert_eq!(query.is_active, Some(false));
    }
}
