use eframe::egui::{self, Color32};

use super::risk_color;
use crate::app::app_core::SensorDashboardApp;
use crate::app::handlers::HistoryHandler;
use crate::history::filter_records;
use crate::utils::format_datetime;

pub fn render_history_panel(app: &mut SensorDashboardApp, ctx: &egui::Context) {
    if !app.state.history.show_history_panel {
        return;
    }

    egui::SidePanel::left("history_panel")
        .resizable(true)
        .default_width(app.state.history.panel_width)
        .width_range(320.0..=900.0)
        .show(ctx, |ui| {
            ui.heading("📊 Sensor History");
            ui.add_space(10.0);

            render_panel_controls(app, ui);
            ui.separator();
            ui.add_space(5.0);

            render_history_table(app, ui);
        });
}

fn render_panel_controls(app: &mut SensorDashboardApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label("Search:");
        ui.add(
            egui::TextEdit::singleline(&mut app.state.history.search_term)
                .desired_width(180.0)
                .hint_text("risk or time"),
        );

        if ui.button("🔄 Refresh").clicked() {
            HistoryHandler::load_first_page(app);
        }
    });

    ui.horizontal(|ui| {
        let pager = &app.state.history.pager;
        let can_go_back = pager.has_previous() && !pager.is_loading();
        let can_go_forward = pager.has_more() && !pager.is_loading();
        let page_number = pager.page_number();

        if ui.add_enabled(can_go_back, egui::Button::new("◀ Previous")).clicked() {
            HistoryHandler::load_previous_page(app);
        }
        ui.label(format!("Page {}", page_number));
        if ui.add_enabled(can_go_forward, egui::Button::new("Next ▶")).clicked() {
            HistoryHandler::load_next_page(app);
        }

        if !app.state.history.loading_status.is_empty() {
            ui.separator();
            ui.colored_label(Color32::from_rgb(0, 100, 200), &app.state.history.loading_status);
        }
    });
}

fn render_history_table(app: &SensorDashboardApp, ui: &mut egui::Ui) {
    let history = &app.state.history;

    if let Some(error) = history.pager.error() {
        ui.colored_label(Color32::from_rgb(150, 0, 0), error);
    }

    let records = filter_records(history.pager.records(), &history.search_term);
    if records.is_empty() {
        ui.centered_and_justified(|ui| {
            let text = if history.pager.is_loading() {
                "Loading history data..."
            } else {
                "No history records"
            };
            ui.colored_label(Color32::GRAY, text);
        });
        return;
    }

    // 数据库保存原始值，这里按当前单位约定换算
    let units = app.state.dashboard.units();

    egui::ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("history_table")
            .striped(true)
            .num_columns(8)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for header in ["Time", "Risk", "Soil", "Rain", "Temp", "Tilt X", "Tilt Y", "Alert"] {
                    ui.strong(header);
                }
                ui.end_row();

                for record in records {
                    let sensors = &record.snapshot.sensors;
                    let status = &record.snapshot.status;

                    ui.label(format_datetime(record.received_at_ms));
                    ui.colored_label(risk_color(status.landslide_risk), status.landslide_risk.as_str());
                    ui.label(format!(
                        "{:.1}{}",
                        units.soil_moisture.to_display(sensors.soil_moisture),
                        units.soil_moisture.suffix()
                    ));
                    ui.label(format!(
                        "{:.1}{}",
                        units.rainfall.to_display(sensors.rainfall),
                        units.rainfall.suffix()
                    ));
                    ui.label(format!("{:.1}°C", sensors.temperature));
                    ui.label(format!("{:.2}°", sensors.tilt.angle_x));
                    ui.label(format!("{:.2}°", sensors.tilt.angle_y));
                    if status.alert_triggered {
                        ui.colored_label(Color32::from_rgb(200, 0, 0), "yes");
                    } else {
                        ui.label("no");
                    }
                    ui.end_row();
                }
            });
    });
}
