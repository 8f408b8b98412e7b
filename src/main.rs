// BAK Clinic desktop client
// Main entry point

use bak_clinic::services::settings::ConfigService;
use bak_clinic::ui_egui::ClinicApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    log::info!("Starting BAK Clinic");

    let config = match ConfigService::default_location() {
        Ok(service) => service.load_or_default(),
        Err(err) => {
            log::warn!("No config directory available ({}), using defaults", err);
            Default::default()
        }
    };
    log::info!("Backend: {}", config.api_base_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("BAK Clinic")
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([960.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "BAK Clinic",
        options,
        Box::new(|cc| Ok(Box::new(ClinicApp::new(cc, config)?))),
    )
}
