mod actions;
mod confirm;
mod context;
mod jobs;
mod lifecycle;
mod results;
mod sidebar;
mod state;
mod toast;

use self::confirm::ConfirmDialogState;
use self::context::AppContext;
use self::jobs::JobRunner;
use self::results::JobResult;
use self::state::AppState;
use self::toast::ToastManager;

pub struct ClinicApp {
    /// Configuration, session and pollers
    context: AppContext,
    /// Per-screen view state
    state: AppState,
    /// Backend calls running off the UI thread
    jobs: JobRunner<JobResult>,
    toast_manager: ToastManager,
    confirm_dialog: ConfirmDialogState,
}

impl eframe::App for ClinicApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.handle_update(ctx, frame);
    }

    fn on_exit(&mut self, gl: Option<&eframe::glow::Context>) {
        self.handle_exit(gl);
    }
}
