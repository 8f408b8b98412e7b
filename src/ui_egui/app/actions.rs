//! View actions turned into background jobs.

use super::confirm::ConfirmAction;
use super::results::JobResult;
use super::state::Screen;
use super::ClinicApp;
use crate::models::patient::PatientQuery;
use crate::models::user::{Role, User, UserQuery};
use crate::scheduling::{execute_change, ScheduleChange};
use crate::services::auth::{AuthApi, AuthService};
use crate::services::patient::PatientService;
use crate::services::surgery::{fetch_schedule, SurgeryService};
use crate::services::user::UserService;
use crate::ui_egui::views::auth::AuthAction;
use crate::ui_egui::views::dashboard::DashboardAction;
use crate::ui_egui::views::patients::PatientsAction;
use crate::ui_egui::views::profile::ProfileAction;
use crate::ui_egui::views::schedule::ScheduleAction;
use crate::ui_egui::views::users::UsersAction;

/// Enough entries to fill the create-surgery pickers
const OPTION_LIST_LIMIT: u32 = 100;

impl ClinicApp {
    pub(super) fn handle_auth_action(&mut self, action: AuthAction) {
        let client = self.context.client();
        match action {
            AuthAction::Open(page) => self.navigate(Screen::from_auth_page(page)),
            AuthAction::Login(request) => {
                self.jobs.spawn("login", move || {
                    JobResult::LoggedIn(AuthService::new(&client).login(&request))
                });
            }
            AuthAction::RequestReset { email } => {
                self.jobs.spawn("forgot-password", move || {
                    JobResult::ResetRequested(AuthService::new(&client).forgot_password(&email))
                });
            }
            AuthAction::ResetPassword { token, password } => {
                self.jobs.spawn("reset-password", move || {
                    JobResult::PasswordReset(
                        AuthService::new(&client).reset_password(&token, &password),
                    )
                });
            }
            AuthAction::VerifyEmail { token } => {
                self.jobs.spawn("verify-email", move || {
                    JobResult::EmailVerified(AuthService::new(&client).verify_email(&token))
                });
            }
        }
    }

    pub(super) fn handle_dashboard_action(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::Refresh => {
                self.context.dashboard().refresh_now();
            }
        }
    }

    pub(super) fn load_schedule(&mut self) {
        self.state.schedule.loading = true;
        let client = self.context.client();
        self.jobs.spawn("load-schedule", move || {
            JobResult::ScheduleLoaded(fetch_schedule(&SurgeryService::new(&client)))
        });
    }

    fn load_create_options(&mut self) {
        let client = self.context.client();
        self.jobs.spawn("load-create-options", move || {
            let patients = PatientService::new(&client).list(&PatientQuery {
                page: Some(1),
                limit: Some(OPTION_LIST_LIMIT),
                search: None,
            });
            let doctors = UserService::new(&client).list(&UserQuery {
                page: Some(1),
                limit: Some(OPTION_LIST_LIMIT),
                role: Some(Role::Doctor),
                is_active: Some(true),
                search: None,
            });

            let result = patients.and_then(|patients| {
                doctors.map(|doctors| {
                    let patient_options = patients
                        .patients
                        .into_iter()
                        .map(|patient| (patient.id, patient.full_name))
                        .collect();
                    let doctor_options = doctors
                        .users
                        .iter()
                        .map(|doctor| (doctor.id.clone(), doctor.full_name()))
                        .collect();
                    (patient_options, doctor_options)
                })
            });
            JobResult::CreateOptionsLoaded(result)
        });
    }

    /// Apply a change locally and send it; the result confirms or rolls it back
    fn commit_schedule_change(&mut self, change: ScheduleChange) {
        let point = self.state.schedule.store.apply_optimistic(&change);
        let client = self.context.client();
        log::info!("Committing schedule change on surgery {}", change.id());
        self.jobs.spawn("schedule-change", move || {
            let result = execute_change(&SurgeryService::new(&client), &change);
            JobResult::ScheduleChanged {
                change,
                point,
                result,
            }
        });
    }

    pub(super) fn handle_schedule_action(&mut self, action: ScheduleAction) {
        match action {
            ScheduleAction::Reload => self.load_schedule(),
            ScheduleAction::LoadCreateOptions => self.load_create_options(),
            ScheduleAction::Commit(change) => self.commit_schedule_change(change),
            ScheduleAction::Rejected(error) => {
                log::info!("Schedule change rejected locally: {}", error);
                self.toast_manager.error(error.to_string());
            }
        }
    }

    pub(super) fn load_patients(&mut self) {
        let query = self.state.patients.query();
        self.spawn_patient_list(query);
    }

    fn spawn_patient_list(&mut self, query: PatientQuery) {
        self.state.patients.loading = true;
        let client = self.context.client();
        self.jobs.spawn("load-patients", move || {
            JobResult::PatientsLoaded(PatientService::new(&client).list(&query))
        });
    }

    pub(super) fn handle_patients_action(&mut self, action: PatientsAction) {
        match action {
            PatientsAction::Load(query) => self.spawn_patient_list(query),
            PatientsAction::Save { form, existing_id } => {
                let client = self.context.client();
                self.jobs.spawn("save-patient", move || {
                    let result = PatientService::new(&client).submit(&form, existing_id.as_deref());
                    JobResult::PatientSaved {
                        existing_id,
                        result,
                    }
                });
            }
            PatientsAction::Delete { id, name } => {
                self.confirm_dialog
                    .request(ConfirmAction::DeletePatient { id, name });
            }
        }
    }

    pub(super) fn delete_patient(&mut self, id: String, name: String) {
        let client = self.context.client();
        self.jobs.spawn("delete-patient", move || JobResult::PatientDeleted {
            result: PatientService::new(&client).delete(&id),
            name,
        });
    }

    pub(super) fn load_users(&mut self) {
        let query = self.state.users.query();
        self.spawn_user_list(query);
    }

    fn spawn_user_list(&mut self, query: UserQuery) {
        self.state.users.loading = true;
        let client = self.context.client();
        self.jobs.spawn("load-users", move || {
            JobResult::UsersLoaded(UserService::new(&client).list(&query))
        });
    }

    pub(super) fn handle_users_action(&mut self, action: UsersAction) {
        let client = self.context.client();
        match action {
            UsersAction::Load(query) => self.spawn_user_list(query),
            UsersAction::Create(request) => {
                self.jobs.spawn("create-user", move || JobResult::UserSaved {
                    created: true,
                    result: UserService::new(&client).create(&request),
                });
            }
            UsersAction::Update { id, request } => {
                self.jobs.spawn("update-user", move || JobResult::UserSaved {
                    created: false,
                    result: UserService::new(&client).update(&id, &request),
                });
            }
            UsersAction::SetActive { id, name, active } => {
                self.confirm_dialog
                    .request(ConfirmAction::SetUserActive { id, name, active });
            }
            UsersAction::Delete { id, name } => {
                self.confirm_dialog
                    .request(ConfirmAction::DeleteUser { id, name });
            }
            UsersAction::ChangePassword { id, password } => {
                self.jobs.spawn("update-user-password", move || JobResult::UserChanged {
                    success: "Contraseña actualizada".to_string(),
                    result: UserService::new(&client).update_password(&id, &password),
                });
            }
        }
    }

    pub(super) fn delete_user(&mut self, id: String, name: String) {
        let client = self.context.client();
        self.jobs.spawn("delete-user", move || JobResult::UserChanged {
            success: format!("Usuario {} eliminado", name),
            result: UserService::new(&client).delete(&id),
        });
    }

    pub(super) fn set_user_active(&mut self, id: String, name: String, active: bool) {
        let client = self.context.client();
        let success = if active {
            format!("Usuario {} activado", name)
        } else {
            format!("Usuario {} desactivado", name)
        };
        self.jobs.spawn("set-user-active", move || JobResult::UserChanged {
            success,
            result: UserService::new(&client).set_active(&id, active),
        });
    }

    pub(super) fn handle_profile_action(&mut self, action: ProfileAction) {
        match action {
            ProfileAction::ChangePassword(password) => {
                let Some(id) = self.context.session().current_user().map(|user| user.id.clone()) else {
                    self.state.profile.saving = false;
                    return;
                };
                let client = self.context.client();
                self.jobs.spawn("update-own-password", move || {
                    JobResult::OwnPasswordChanged(
                        UserService::new(&client).update_password(&id, &password),
                    )
                });
            }
            ProfileAction::Logout => self.confirm_dialog.request(ConfirmAction::Logout),
        }
    }

    /// Keep the cached session user in step with edits made through the users screen
    pub(super) fn refresh_own_user(&mut self, user: User) {
        let is_self = self
            .context
            .session()
            .current_user()
            .is_some_and(|current| current.id == user.id);
        if !is_self {
            return;
        }
        if let Err(err) = self.context.session_mut().update_user(user) {
            log::warn!("Could not refresh the session user: {}", err);
        }
    }

    pub(super) fn logout(&mut self) {
        log::info!("User requested logout");
        self.context.session_mut().logout();
    }
}
