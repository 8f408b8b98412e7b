mod app;
pub mod drag;
mod views;

pub use app::ClinicApp;
