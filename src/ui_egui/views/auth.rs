//! Signed-out screens: login, forgotten password, reset and e-mail verification.

use egui::RichText;

use super::widgets::{centered_card, error_text, success_text};
use crate::models::patient::is_valid_email;
use crate::models::user::LoginRequest;
use crate::services::auth::{validate_login, validate_new_password};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPage {
    Login,
    ForgotPassword,
    ResetPassword,
    VerifyEmail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    Login(LoginRequest),
    RequestReset { email: String },
    ResetPassword { token: String, password: String },
    VerifyEmail { token: String },
    Open(AuthPage),
}

#[derive(Debug, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub token: String,
    pub error: Option<String>,
    pub info: Option<String>,
    pub busy: bool,
}

impl AuthForm {
    /// Reset everything except the e-mail, which carries over between pages
    pub fn reset(&mut self) {
        let email = std::mem::take(&mut self.email);
        *self = Self {
            email,
            ..Self::default()
        };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.busy = false;
        self.info = None;
        self.error = Some(message.into());
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.busy = false;
        self.error = None;
        self.info = Some(message.into());
    }
}

fn messages(ui: &mut egui::Ui, form: &AuthForm) {
    if let Some(error) = &form.error {
        error_text(ui, error);
    }
    if let Some(info) = &form.info {
        success_text(ui, info);
    }
}

fn submit_button(ui: &mut egui::Ui, form: &AuthForm, label: &str, busy_label: &str) -> bool {
    let text = if form.busy { busy_label } else { label };
    ui.add_enabled(!form.busy, egui::Button::new(text).min_size(egui::vec2(ui.available_width(), 32.0)))
        .clicked()
}

fn enter_pressed(ui: &egui::Ui, response: &egui::Response) -> bool {
    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
}

pub fn show(ui: &mut egui::Ui, page: AuthPage, form: &mut AuthForm) -> Option<AuthAction> {
    centered_card(ui, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading(RichText::new("BAK Clinic").strong());
            ui.label(RichText::new("Sistema de administración").weak());
        });
        ui.add_space(12.0);

        match page {
            AuthPage::Login => show_login(ui, form),
            AuthPage::ForgotPassword => show_forgot_password(ui, form),
            AuthPage::ResetPassword => show_reset_password(ui, form),
            AuthPage::VerifyEmail => show_verify_email(ui, form),
        }
    })
}

fn show_login(ui: &mut egui::Ui, form: &mut AuthForm) -> Option<AuthAction> {
    let mut action = None;

    ui.label("Email");
    ui.add(egui::TextEdit::singleline(&mut form.email).hint_text("usuario@bak.cl"));
    ui.label("Contraseña");
    let password = ui.add(egui::TextEdit::singleline(&mut form.password).password(true));
    ui.add_space(8.0);
    messages(ui, form);

    if submit_button(ui, form, "Iniciar sesión", "Iniciando sesión...") || enter_pressed(ui, &password) {
        match validate_login(&form.email, &form.password) {
            Ok(request) => {
                form.busy = true;
                form.error = None;
                action = Some(AuthAction::Login(request));
            }
            Err(err) => form.fail(err.to_string()),
        }
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.link("¿Olvidó su contraseña?").clicked() {
            action = Some(AuthAction::Open(AuthPage::ForgotPassword));
        }
        if ui.link("Verificar email").clicked() {
            action = Some(AuthAction::Open(AuthPage::VerifyEmail));
        }
    });
    action
}

fn show_forgot_password(ui: &mut egui::Ui, form: &mut AuthForm) -> Option<AuthAction> {
    let mut action = None;

    ui.label(RichText::new("Recuperar contraseña").strong());
    ui.label("Ingrese su email y le enviaremos las instrucciones.");
    ui.add_space(6.0);
    let email = ui.add(egui::TextEdit::singleline(&mut form.email).hint_text("usuario@bak.cl"));
    ui.add_space(8.0);
    messages(ui, form);

    if submit_button(ui, form, "Enviar instrucciones", "Enviando...") || enter_pressed(ui, &email) {
        let address = form.email.trim().to_string();
        if address.is_empty() {
            form.fail("El email es requerido");
        } else if !is_valid_email(&address) {
            form.fail("Email inválido");
        } else {
            form.busy = true;
            form.error = None;
            action = Some(AuthAction::RequestReset { email: address });
        }
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.link("Ya tengo un código").clicked() {
            action = Some(AuthAction::Open(AuthPage::ResetPassword));
        }
        if ui.link("Volver al inicio de sesión").clicked() {
            action = Some(AuthAction::Open(AuthPage::Login));
        }
    });
    action
}

fn show_reset_password(ui: &mut egui::Ui, form: &mut AuthForm) -> Option<AuthAction> {
    let mut action = None;

    ui.label(RichText::new("Restablecer contraseña").strong());
    ui.label("Código de recuperación");
    ui.text_edit_singleline(&mut form.token);
    ui.label("Nueva contraseña");
    ui.add(egui::TextEdit::singleline(&mut form.password).password(true));
    ui.label("Confirmar contraseña");
    let confirm = ui.add(egui::TextEdit::singleline(&mut form.confirm_password).password(true));
    ui.add_space(8.0);
    messages(ui, form);

    if submit_button(ui, form, "Restablecer", "Restableciendo...") || enter_pressed(ui, &confirm) {
        if form.token.trim().is_empty() {
            form.fail("Token de recuperación inválido");
        } else {
            match validate_new_password(&form.password, &form.confirm_password) {
                Ok(()) => {
                    form.busy = true;
                    form.error = None;
                    action = Some(AuthAction::ResetPassword {
                        token: form.token.trim().to_string(),
                        password: form.password.clone(),
                    });
                }
                Err(err) => form.fail(err.to_string()),
            }
        }
    }

    ui.add_space(8.0);
    if ui.link("Volver al inicio de sesión").clicked() {
        action = Some(AuthAction::Open(AuthPage::Login));
    }
    action
}

fn show_verify_email(ui: &mut egui::Ui, form: &mut AuthForm) -> Option<AuthAction> {
    let mut action = None;

    ui.label(RichText::new("Verificar email").strong());
    ui.label("Pegue el código de verificación recibido por correo.");
    let token = ui.text_edit_singleline(&mut form.token);
    ui.add_space(8.0);
    messages(ui, form);

    if submit_button(ui, form, "Verificar", "Verificando...") || enter_pressed(ui, &token) {
        if form.token.trim().is_empty() {
            form.fail("El código de verificación es requerido");
        } else {
            form.busy = true;
            form.error = None;
            action = Some(AuthAction::VerifyEmail {
                token: form.token.trim().to_string(),
            });
        }
    }

    ui.add_space(8.0);
    if ui.link("Volver al inicio de sesión").clicked() {
        action = Some(AuthAction::Open(AuthPage::Login));
    }
    action
}
