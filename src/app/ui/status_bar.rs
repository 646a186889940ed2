use eframe::egui;

use super::risk_color;
use crate::app::app_core::SensorDashboardApp;
use crate::app::handlers::{HistoryHandler, LiveFeedHandler};
use crate::dashboard::FeedStatus;
use crate::utils::format_time;

pub fn render_status_bar(app: &mut SensorDashboardApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("status_bar")
        .min_height(40.0)
        .show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label("Feed:");

                let status_color = match app.state.dashboard.status() {
                    FeedStatus::Loading => egui::Color32::from_rgb(255, 165, 0), // 橙色
                    FeedStatus::Live => egui::Color32::from_rgb(0, 150, 0),      // 绿色
                    FeedStatus::DataNotFound | FeedStatus::ConnectionLost(_) => egui::Color32::from_rgb(150, 0, 0),
                };
                ui.colored_label(status_color, app.state.get_status_summary());

                if app.state.dashboard.status().is_error() && ui.button("🔄 Reconnect").clicked() {
                    LiveFeedHandler::reconnect(app);
                }

                ui.separator();

                if let Some(latest) = app.state.dashboard.latest() {
                    let status = &latest.snapshot.status;
                    ui.label("Risk:");
                    ui.colored_label(
                        risk_color(status.landslide_risk),
                        status.landslide_risk.as_str().to_uppercase(),
                    );
                    ui.separator();
                    if status.alert_triggered {
                        ui.colored_label(egui::Color32::from_rgb(200, 0, 0), "⚠ ALERT ACTIVE");
                    } else {
                        ui.label("Alert: inactive");
                    }
                    ui.separator();
                    ui.label(format!("Last update: {}", format_time(latest.received_at_ms)));
                }

                // 在最右边添加历史面板按钮
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let history_button_text = if app.state.history.show_history_panel {
                        "📊 Hide History"
                    } else {
                        "📊 Show History"
                    };

                    if ui.button(history_button_text).clicked() {
                        app.state.history.show_history_panel = !app.state.history.show_history_panel;

                        // 打开面板时从第一页开始加载
                        if app.state.history.show_history_panel {
                            HistoryHandler::load_first_page(app);
                        }
                    }

                    if let Some(count) = app.state.history.record_count {
                        ui.label(format!("DB: {} records", count));
                    } else {
                        ui.label("DB: DuckDB");
                    }
                });
            });
            ui.add_space(5.0);
        });
}
