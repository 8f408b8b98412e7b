//! Results delivered by background jobs and how the app applies them.

use super::state::Screen;
use super::ClinicApp;
use crate::models::pagination::Pagination;
use crate::models::patient::{Patient, PatientListResponse};
use crate::models::surgery::SurgeryRecord;
use crate::models::user::{AuthResponse, ForgotPasswordResponse, UserEnvelope, UserListResponse};
use crate::scheduling::{ChangeOutcome, RollbackPoint, ScheduleChange, ScheduleError};
use crate::services::api::{ApiError, MessageResponse};
use crate::services::patient::PatientSubmitError;
use crate::ui_egui::views::schedule::PickOption;

pub enum JobResult {
    LoggedIn(Result<AuthResponse, ApiError>),
    ResetRequested(Result<ForgotPasswordResponse, ApiError>),
    PasswordReset(Result<MessageResponse, ApiError>),
    EmailVerified(Result<MessageResponse, ApiError>),
    ScheduleLoaded(Result<(Vec<SurgeryRecord>, Vec<SurgeryRecord>), ApiError>),
    ScheduleChanged {
        change: ScheduleChange,
        point: RollbackPoint,
        result: Result<ChangeOutcome, ScheduleError>,
    },
    CreateOptionsLoaded(Result<(Vec<PickOption>, Vec<PickOption>), ApiError>),
    PatientsLoaded(Result<PatientListResponse, ApiError>),
    PatientSaved {
        existing_id: Option<String>,
        result: Result<Patient, PatientSubmitError>,
    },
    PatientDeleted {
        name: String,
        result: Result<MessageResponse, ApiError>,
    },
    UsersLoaded(Result<UserListResponse, ApiError>),
    UserSaved {
        created: bool,
        result: Result<UserEnvelope, ApiError>,
    },
    /// Delete, (de)activation or password reset of another account
    UserChanged {
        success: String,
        result: Result<MessageResponse, ApiError>,
    },
    OwnPasswordChanged(Result<MessageResponse, ApiError>),
}

fn message_or(response: &MessageResponse, fallback: &str) -> String {
    response
        .message
        .clone()
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl ClinicApp {
    /// Ends the session when the backend stopped accepting the token; returns the display text
    pub(super) fn api_error_text(&mut self, error: &ApiError) -> String {
        if error.is_unauthorized() && self.context.session().is_authenticated() {
            self.context
                .session_mut()
                .invalidate("Su sesión ha expirado. Inicie sesión nuevamente.");
        }
        error.to_string()
    }

    pub(super) fn handle_job_result(&mut self, result: JobResult) {
        match result {
            JobResult::LoggedIn(result) => self.on_logged_in(result),
            JobResult::ResetRequested(result) => match result {
                Ok(response) => {
                    let message = response
                        .message
                        .unwrap_or_else(|| "Revise su correo para continuar".to_string());
                    self.state.auth_form.succeed(message);
                    if let Some(token) = response.reset_token {
                        self.state.auth_form.token = token;
                    }
                }
                Err(error) => self.state.auth_form.fail(error.to_string()),
            },
            JobResult::PasswordReset(result) => match result {
                Ok(response) => {
                    self.toast_manager
                        .success(message_or(&response, "Contraseña restablecida"));
                    self.navigate(Screen::Login);
                }
                Err(error) => self.state.auth_form.fail(error.to_string()),
            },
            JobResult::EmailVerified(result) => match result {
                Ok(response) => {
                    let message = message_or(&response, "Email verificado");
                    self.state.auth_form.succeed(message);
                }
                Err(error) => self.state.auth_form.fail(error.to_string()),
            },
            JobResult::ScheduleLoaded(result) => self.on_schedule_loaded(result),
            JobResult::ScheduleChanged {
                change,
                point,
                result,
            } => self.on_schedule_changed(change, point, result),
            JobResult::CreateOptionsLoaded(result) => match result {
                Ok((patients, doctors)) => {
                    self.state.schedule.patient_options = patients;
                    self.state.schedule.doctor_options = doctors;
                }
                Err(error) => {
                    let text = self.api_error_text(&error);
                    self.state.schedule.create_error = Some(text);
                }
            },
            JobResult::PatientsLoaded(result) => {
                self.state.patients.loading = false;
                match result {
                    Ok(response) => {
                        self.state.patients.patients = response.patients;
                        self.state.patients.pagination = response.pagination;
                        self.state.patients.error = None;
                    }
                    Err(error) => {
                        let text = self.api_error_text(&error);
                        self.state.patients.error = Some(text);
                    }
                }
            }
            JobResult::PatientSaved {
                existing_id,
                result,
            } => self.on_patient_saved(existing_id, result),
            JobResult::PatientDeleted { name, result } => match result {
                Ok(_) => {
                    self.toast_manager
                        .success(format!("Paciente {} eliminado", name));
                    self.load_patients();
                }
                Err(error) => {
                    let text = self.api_error_text(&error);
                    self.toast_manager.error(text);
                }
            },
            JobResult::UsersLoaded(result) => {
                self.state.users.loading = false;
                match result {
                    Ok(response) => {
                        self.state.users.pagination =
                            Pagination::from_totals(response.page, response.limit, response.total);
                        self.state.users.users = response.users;
                        self.state.users.error = None;
                    }
                    Err(error) => {
                        let text = self.api_error_text(&error);
                        self.state.users.error = Some(text);
                    }
                }
            }
            JobResult::UserSaved { created, result } => match result {
                Ok(envelope) => {
                    let fallback = if created {
                        format!("Usuario {} creado", envelope.user.full_name())
                    } else {
                        format!("Usuario {} actualizado", envelope.user.full_name())
                    };
                    self.toast_manager
                        .success(envelope.message.unwrap_or(fallback));
                    self.refresh_own_user(envelope.user);
                    self.load_users();
                }
                Err(error) => {
                    let text = self.api_error_text(&error);
                    self.toast_manager.error(text);
                }
            },
            JobResult::UserChanged { success, result } => match result {
                Ok(_) => {
                    self.toast_manager.success(success);
                    self.load_users();
                }
                Err(error) => {
                    let text = self.api_error_text(&error);
                    self.toast_manager.error(text);
                }
            },
            JobResult::OwnPasswordChanged(result) => {
                self.state.profile.saving = false;
                match result {
                    Ok(response) => {
                        self.state.profile.password.clear();
                        self.state.profile.confirm_password.clear();
                        self.state.profile.error = None;
                        self.state.profile.info =
                            Some(message_or(&response, "Contraseña actualizada"));
                    }
                    Err(error) => {
                        let text = self.api_error_text(&error);
                        self.state.profile.error = Some(text);
                    }
                }
            }
        }
    }

    fn on_logged_in(&mut self, result: Result<AuthResponse, ApiError>) {
        match result {
            Ok(response) => {
                let name = response.user.full_name();
                if let Err(err) = self
                    .context
                    .session_mut()
                    .establish(response.token, response.user)
                {
                    self.state.auth_form.fail(err.to_string());
                    return;
                }
                self.toast_manager.success(format!("Bienvenido, {}", name));
            }
            Err(error) => {
                log::warn!("Login failed: {}", error);
                self.state.auth_form.fail(error.to_string());
            }
        }
    }

    fn on_schedule_loaded(&mut self, result: Result<(Vec<SurgeryRecord>, Vec<SurgeryRecord>), ApiError>) {
        self.state.schedule.loading = false;
        match result {
            Ok((pending, scheduled)) => {
                let schedule = &mut self.state.schedule;
                schedule.store.replace_pending(&pending);
                schedule.store.replace_scheduled(&scheduled);
                schedule.loaded = true;
                schedule.error = None;
                schedule.drop_stale_edit();
            }
            Err(error) => {
                let text = self.api_error_text(&error);
                self.state.schedule.error = Some(text);
            }
        }
    }

    fn on_schedule_changed(
        &mut self,
        change: ScheduleChange,
        point: RollbackPoint,
        result: Result<ChangeOutcome, ScheduleError>,
    ) {
        match result {
            Ok(outcome) => {
                self.state.schedule.store.confirm(&change, outcome);
                self.toast_manager.success(change.success_message());
            }
            Err(error) => {
                log::warn!("Schedule change on {} failed: {}", change.id(), error);
                self.state.schedule.store.rollback(point);
                let unauthorized = match &error {
                    ScheduleError::Api(api) => api.is_unauthorized(),
                    ScheduleError::StatusUpdateFailed { error, .. } => error.is_unauthorized(),
                    _ => false,
                };
                if unauthorized && self.context.session().is_authenticated() {
                    self.context
                        .session_mut()
                        .invalidate("Su sesión ha expirado. Inicie sesión nuevamente.");
                }
                self.toast_manager.error(error.to_string());
            }
        }
        self.state.schedule.drop_stale_edit();
    }

    fn on_patient_saved(&mut self, existing_id: Option<String>, result: Result<Patient, PatientSubmitError>) {
        let Some(modal) = self.state.patients.modal.as_mut() else {
            return;
        };
        modal.saving = false;

        match result {
            Ok(patient) => {
                self.state.patients.modal = None;
                let verb = if existing_id.is_some() { "actualizado" } else { "creado" };
                self.toast_manager
                    .success(format!("Paciente {} {}", patient.full_name, verb));
                self.load_patients();
            }
            Err(PatientSubmitError::Invalid(errors)) => modal.errors = errors,
            Err(PatientSubmitError::Api(error)) => {
                let text = error.to_string();
                modal.server_error = Some(text);
                if error.is_unauthorized() {
                    let _ = self.api_error_text(&error);
                }
            }
        }
    }
}
