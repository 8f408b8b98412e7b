//! Dashboard screen: headline counters, today's activity and analytics panels.

use chrono::{DateTime, Local};
use egui::RichText;

use super::widgets::error_text;
use crate::models::dashboard::DashboardSnapshot;
use crate::utils::date::format_datetime_es;

#[derive(Debug, Default)]
pub struct DashboardView {
    pub snapshot: Option<DashboardSnapshot>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
}

impl DashboardView {
    /// A failed refresh keeps the last good snapshot on screen
    pub fn apply(&mut self, result: Result<DashboardSnapshot, String>) {
        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.error = None;
                self.last_updated = Some(Local::now());
            }
            Err(message) => self.error = Some(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Refresh,
}

fn stat_card(ui: &mut egui::Ui, title: &str, value: String, detail: Option<String>) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_min_width(170.0);
            ui.label(RichText::new(title).weak());
            ui.label(RichText::new(value).size(26.0).strong());
            if let Some(detail) = detail {
                ui.label(RichText::new(detail).small());
            }
        });
}

/// One decimal, halves rounded away from zero
fn percent(value: f64) -> String {
    format!("{:.1}%", (value * 10.0).round() / 10.0)
}

fn money(value: f64) -> String {
    format!("${:.0}", value)
}

pub fn show(ui: &mut egui::Ui, view: &DashboardView, loading: bool) -> Option<DashboardAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading("Dashboard");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add_enabled(!loading, egui::Button::new("⟳ Actualizar")).clicked() {
                action = Some(DashboardAction::Refresh);
            }
            if loading {
                ui.spinner();
            }
            if let Some(updated) = view.last_updated {
                ui.label(
                    RichText::new(format!("Actualizado {}", updated.format("%H:%M:%S"))).weak(),
                );
            }
        });
    });
    ui.separator();

    if let Some(error) = &view.error {
        error_text(ui, error);
    }

    let Some(snapshot) = &view.snapshot else {
        if view.error.is_none() {
            ui.label("Cargando datos del dashboard...");
        }
        return action;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            show_counters(ui, snapshot);
            ui.add_space(12.0);
            ui.columns(2, |columns| {
                show_today(&mut columns[0], snapshot);
                show_rooms(&mut columns[1], snapshot);
            });
            ui.add_space(12.0);
            ui.columns(2, |columns| {
                show_doctors(&mut columns[0], snapshot);
                show_revenue(&mut columns[1], snapshot);
            });
        });

    action
}

fn show_counters(ui: &mut egui::Ui, snapshot: &DashboardSnapshot) {
    let stats = snapshot.stats.clone().unwrap_or_default();
    let patients = snapshot.patient_analytics.clone().unwrap_or_default();
    let unread_alerts = snapshot.alerts.as_ref().map_or(0, |alerts| alerts.unread_count);

    ui.horizontal_wrapped(|ui| {
        stat_card(
            ui,
            "Pacientes",
            stats.total_patients.to_string(),
            Some(format!("{} nuevos este mes", patients.new_patients_this_month)),
        );
        stat_card(
            ui,
            "Cirugías",
            stats.total_surgeries.to_string(),
            Some(format!("{} completadas", stats.completed_surgeries)),
        );
        stat_card(
            ui,
            "Pendientes",
            stats.pending_surgeries.to_string(),
            Some(format!("{} programadas", stats.scheduled_surgeries)),
        );
        stat_card(
            ui,
            "Médicos activos",
            format!("{}/{}", stats.active_doctors, stats.total_doctors),
            None,
        );
        stat_card(
            ui,
            "Usuarios activos",
            format!("{}/{}", stats.active_users, stats.total_users),
            None,
        );
        stat_card(ui, "Alertas", unread_alerts.to_string(), Some("sin leer".to_string()));
    });
}

fn show_today(ui: &mut egui::Ui, snapshot: &DashboardSnapshot) {
    ui.label(RichText::new("Hoy").strong());
    let Some(realtime) = &snapshot.realtime else {
        return;
    };

    let today = &realtime.today_stats;
    egui::Grid::new("dashboard_today").num_columns(2).show(ui, |ui| {
        ui.label("Programadas");
        ui.label(today.scheduled_surgeries.to_string());
        ui.end_row();
        ui.label("En curso");
        ui.label(today.in_progress_surgeries.to_string());
        ui.end_row();
        ui.label("Completadas");
        ui.label(today.completed_surgeries.to_string());
        ui.end_row();
        ui.label("Pabellones ocupados");
        ui.label(realtime.busy_operating_rooms.to_string());
        ui.end_row();
    });

    ui.add_space(8.0);
    ui.label(RichText::new("Próximas cirugías").strong());
    if realtime.next_surgeries.is_empty() {
        ui.label(RichText::new("Sin cirugías próximas").weak());
    }
    for surgery in &realtime.next_surgeries {
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(format_datetime_es(&surgery.scheduled_time)).monospace());
            ui.label(format!(
                "{} · {} · {} ({})",
                surgery.patient_name, surgery.surgery_type, surgery.doctor_name, surgery.operating_room
            ));
        });
    }
}

fn show_rooms(ui: &mut egui::Ui, snapshot: &DashboardSnapshot) {
    ui.label(RichText::new("Uso de pabellones").strong());
    let Some(utilization) = &snapshot.room_utilization else {
        return;
    };

    ui.label(format!("General: {}", percent(utilization.overall_utilization)));
    for room in &utilization.rooms {
        ui.horizontal(|ui| {
            ui.label(&room.name);
            ui.add(
                egui::ProgressBar::new((room.utilization_rate / 100.0).clamp(0.0, 1.0) as f32)
                    .text(percent(room.utilization_rate))
                    .desired_width(180.0),
            );
            ui.label(RichText::new(format!("{} cirugías", room.surgeries.len())).weak());
        });
    }
}

fn show_doctors(ui: &mut egui::Ui, snapshot: &DashboardSnapshot) {
    ui.label(RichText::new("Médicos destacados").strong());
    let Some(performance) = &snapshot.doctor_performance else {
        return;
    };

    egui::Grid::new("dashboard_doctors")
        .num_columns(3)
        .striped(true)
        .show(ui, |ui| {
            ui.label(RichText::new("Médico").weak());
            ui.label(RichText::new("Cirugías").weak());
            ui.label(RichText::new("Éxito").weak());
            ui.end_row();
            for performer in &performance.top_performers {
                ui.label(&performer.doctor_name);
                ui.label(performer.total_surgeries.unwrap_or(0).to_string());
                ui.label(percent(performer.success_rate));
                ui.end_row();
            }
        });
}

fn show_revenue(ui: &mut egui::Ui, snapshot: &DashboardSnapshot) {
    ui.label(RichText::new("Ingresos").strong());
    let Some(revenue) = &snapshot.revenue_analytics else {
        return;
    };

    egui::Grid::new("dashboard_revenue").num_columns(2).show(ui, |ui| {
        ui.label("Este mes");
        ui.label(money(revenue.this_month.total_revenue));
        ui.end_row();
        ui.label("Mes anterior");
        ui.label(money(revenue.last_month.total_revenue));
        ui.end_row();
        ui.label("Crecimiento");
        ui.label(percent(revenue.growth.revenue_growth));
        ui.end_row();
        ui.label("Promedio por cirugía");
        ui.label(money(revenue.this_month.average_per_surgery));
        ui.end_row();
    });

    if let Some(analytics) = &snapshot.surgery_analytics {
        ui.add_space(8.0);
        ui.label(RichText::new("Cirugías por estado").strong());
        for (status, count) in &analytics.by_status {
            ui.label(format!("{}: {}", status, count));
        }
    }
}
