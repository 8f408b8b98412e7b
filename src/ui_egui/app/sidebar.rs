//! Navigation sidebar shown while signed in.

use egui::RichText;

use super::confirm::ConfirmAction;
use super::state::Screen;
use super::ClinicApp;

const SIDEBAR_WIDTH: f32 = 190.0;

impl ClinicApp {
    pub(super) fn render_sidebar(&mut self, ctx: &egui::Context) {
        let mut target = None;

        egui::SidePanel::left("sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading(RichText::new("BAK Clinic").strong());
                if let Some(user) = self.context.session().current_user() {
                    ui.label(user.full_name());
                    ui.label(RichText::new(user.role.label()).small().weak());
                }
                ui.add_space(8.0);
                ui.separator();

                let user = self.context.session().current_user();
                for screen in Screen::NAVIGATION {
                    if !screen.allowed_for(user) {
                        continue;
                    }
                    let selected = self.state.screen == screen;
                    let label = format!("{}  {}", screen.icon(), screen.title());
                    if ui
                        .add_sized(
                            [ui.available_width(), 28.0],
                            egui::SelectableLabel::new(selected, label),
                        )
                        .clicked()
                    {
                        target = Some(screen);
                    }
                }

                ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                    ui.add_space(8.0);
                    if ui.button("Cerrar sesión").clicked() {
                        self.confirm_dialog.request(ConfirmAction::Logout);
                    }
                    ui.label(
                        RichText::new(self.context.config().api_base_url.as_str())
                            .small()
                            .weak(),
                    );
                });
            });

        if let Some(screen) = target {
            self.navigate(screen);
        }
    }
}
