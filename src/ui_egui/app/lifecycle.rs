use std::time::Duration;

use anyhow::Result;

use super::confirm::ConfirmDialogState;
use super::context::AppContext;
use super::jobs::JobRunner;
use super::state::{AppState, Screen};
use super::toast::ToastManager;
use super::ClinicApp;
use crate::models::settings::AppConfig;
use crate::services::api::ApiClient;
use crate::services::session::{
    FileSessionStorage, MemorySessionStorage, SessionEvent, SessionService, SessionStorage,
};
use crate::ui_egui::views;

/// Repaint cadence while background work may deliver results
const ACTIVE_REPAINT: Duration = Duration::from_millis(100);
const IDLE_REPAINT: Duration = Duration::from_secs(1);

impl ClinicApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self> {
        let client = ApiClient::from_config(&config)?;
        let mut session = SessionService::new(open_session_storage(), client);

        let screen = match session.restore() {
            Some(user) => {
                log::info!("Restored session for {}", user.email);
                Screen::Dashboard
            }
            None => Screen::Login,
        };

        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let state = AppState::new(&config);
        let mut app = Self {
            context: AppContext::new(config, session),
            state,
            jobs: JobRunner::new(),
            toast_manager: ToastManager::new(),
            confirm_dialog: ConfirmDialogState::new(),
        };

        if app.context.session().is_authenticated() {
            app.context.start_monitor();
        }
        app.navigate(screen);
        Ok(app)
    }

    /// Switch screens, redirecting to the login when the screen needs a session
    pub(super) fn navigate(&mut self, screen: Screen) {
        let screen = if screen.allowed_for(self.context.session().current_user()) {
            screen
        } else if self.context.session().is_authenticated() {
            Screen::Dashboard
        } else {
            Screen::Login
        };

        let previous = self.state.screen;
        self.state.screen = screen;

        if screen.auth_page().is_some() && previous != screen {
            self.state.auth_form.reset();
        }

        if screen == Screen::Dashboard {
            if !self.context.dashboard().is_running() {
                let period = self.context.dashboard_period();
                self.context.dashboard_mut().start(period);
            }
        } else if self.context.dashboard().is_running() {
            self.context.dashboard_mut().stop();
        }

        if previous == screen {
            return;
        }
        log::debug!("Navigating to {:?}", screen);

        match screen {
            Screen::Schedule if !self.state.schedule.loaded => self.load_schedule(),
            Screen::Patients => self.load_patients(),
            Screen::Users => self.load_users(),
            Screen::Profile => {
                self.state.profile = views::profile::ProfileView::default();
            }
            _ => {}
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LoggedIn(user) => {
                log::info!("Signed in as {} ({})", user.email, user.role.as_str());
                let config = self.context.config().clone();
                self.state.reset_session_data(&config);
                self.context.start_monitor();
                self.navigate(Screen::Dashboard);
            }
            SessionEvent::UserUpdated(_) => {}
            SessionEvent::LoggedOut => {
                self.end_session_ui();
                self.toast_manager.info("Sesión cerrada");
            }
            SessionEvent::Invalidated(reason) => {
                self.end_session_ui();
                self.toast_manager.warning(reason);
            }
        }
    }

    fn end_session_ui(&mut self) {
        self.context.stop_monitor();
        self.context.dashboard_mut().stop();
        let config = self.context.config().clone();
        self.state.reset_session_data(&config);
        self.navigate(Screen::Login);
    }

    fn poll_background(&mut self) {
        for result in self.jobs.drain() {
            self.handle_job_result(result);
        }

        if let Some(reason) = self.context.poll_monitor() {
            self.context.session_mut().invalidate(&reason);
        }

        if let Some(result) = self.context.dashboard().poll() {
            let result = result.map_err(|error| self.api_error_text(&error));
            self.state.dashboard.apply(result);
        }

        for event in self.context.drain_session_events() {
            self.handle_session_event(event);
        }
    }

    pub(super) fn handle_update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background();

        if self.state.screen.requires_auth() {
            self.render_sidebar(ctx);
        }
        self.render_main_panel(ctx);

        self.handle_confirm_dialog(ctx);

        // Toasts last so they sit on top
        self.toast_manager.render(ctx);

        let busy = !self.jobs.is_idle()
            || self.context.dashboard().is_running()
            || self.toast_manager.has_toasts();
        ctx.request_repaint_after(if busy { ACTIVE_REPAINT } else { IDLE_REPAINT });
    }

    fn render_main_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| match self.state.screen {
            Screen::Login | Screen::ForgotPassword | Screen::ResetPassword | Screen::VerifyEmail => {
                let page = self.state.screen.auth_page();
                if let Some(action) =
                    page.and_then(|page| views::auth::show(ui, page, &mut self.state.auth_form))
                {
                    self.handle_auth_action(action);
                }
            }
            Screen::Dashboard => {
                let loading = self.context.dashboard().is_loading();
                if let Some(action) = views::dashboard::show(ui, &self.state.dashboard, loading) {
                    self.handle_dashboard_action(action);
                }
            }
            Screen::Schedule => {
                for action in views::schedule::show(ui, &mut self.state.schedule) {
                    self.handle_schedule_action(action);
                }
            }
            Screen::Patients => {
                for action in views::patients::show(ui, &mut self.state.patients) {
                    self.handle_patients_action(action);
                }
            }
            Screen::Users => {
                let own_id = self
                    .context
                    .session()
                    .current_user()
                    .map(|user| user.id.clone());
                for action in views::users::show(ui, &mut self.state.users, own_id.as_deref()) {
                    self.handle_users_action(action);
                }
            }
            Screen::Profile => {
                let Some(user) = self.context.session().current_user().cloned() else {
                    return;
                };
                if let Some(action) = views::profile::show(ui, &mut self.state.profile, &user) {
                    self.handle_profile_action(action);
                }
            }
        });
    }

    pub(super) fn handle_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.context.stop_monitor();
        self.context.dashboard_mut().stop();
    }
}

fn open_session_storage() -> Box<dyn SessionStorage> {
    match FileSessionStorage::default_location() {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            log::warn!("Session storage unavailable ({}); sessions will not persist", err);
            Box::new(MemorySessionStorage::new())
        }
    }
}
