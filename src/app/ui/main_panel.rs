use eframe::egui::{self, Color32, RichText};

use super::orientation_view::render_orientation_cube;
use super::risk_color;
use crate::app::app_core::SensorDashboardApp;
use crate::app::handlers::LiveFeedHandler;
use crate::dashboard::FeedStatus;
use crate::plotter::{environment_colors, plot_scalar, plot_triaxial};
use crate::types::ReceivedSnapshot;
use crate::utils::format_datetime;

pub fn render_main_panel(app: &mut SensorDashboardApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        match app.state.dashboard.status().clone() {
            FeedStatus::Loading => {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(Color32::GRAY, "Loading data...");
                });
            }
            status @ (FeedStatus::DataNotFound | FeedStatus::ConnectionLost(_)) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.colored_label(Color32::from_rgb(150, 0, 0), RichText::new(status.message()).size(20.0));
                    ui.add_space(10.0);
                    if ui.button("🔄 Reconnect").clicked() {
                        LiveFeedHandler::reconnect(app);
                    }
                });
            }
            FeedStatus::Live => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    render_live_view(app, ui);
                });
            }
        }
    });
}

fn render_live_view(app: &SensorDashboardApp, ui: &mut egui::Ui) {
    let dashboard = &app.state.dashboard;
    let plot_config = &app.config.get_config().plot;

    if let Some(latest) = dashboard.latest() {
        render_cards(app, ui, latest);
        ui.add_space(10.0);
    }

    ui.horizontal_top(|ui| {
        ui.vertical(|ui| {
            ui.heading("Orientation");
            render_orientation_cube(ui, &dashboard.orientation(), 180.0);
        });
        ui.separator();
        ui.vertical(|ui| {
            ui.heading("Accelerometer (m/s²)");
            plot_triaxial(ui, "live_acceleration", dashboard.acceleration(), plot_config);
        });
    });

    ui.separator();
    ui.heading("Gyroscope (rad/s)");
    plot_triaxial(ui, "live_gyroscope", dashboard.gyroscope(), plot_config);

    ui.separator();
    ui.heading("Environment");
    let environment = dashboard.environment();
    let units = dashboard.units();
    let [soil_color, rain_color, temp_color] = environment_colors(&plot_config.colors);
    let height = plot_config.plot_height * 0.75;

    ui.label(format!("Soil moisture ({})", units.soil_moisture.suffix().trim()));
    plot_scalar(ui, "live_soil", "Soil moisture", &environment.soil_moisture, soil_color, height);
    ui.label(format!("Rainfall ({})", units.rainfall.suffix().trim()));
    plot_scalar(ui, "live_rainfall", "Rainfall", &environment.rainfall, rain_color, height);
    ui.label("Temperature (°C)");
    plot_scalar(ui, "live_temperature", "Temperature", &environment.temperature, temp_color, height);
}

fn render_cards(app: &SensorDashboardApp, ui: &mut egui::Ui, latest: &ReceivedSnapshot) {
    let sensors = &latest.snapshot.sensors;
    let status = &latest.snapshot.status;
    let units = app.state.dashboard.units();

    ui.horizontal_wrapped(|ui| {
        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.strong("Accelerometer");
                ui.label(format!("X: {:.3}", sensors.accelerometer.x));
                ui.label(format!("Y: {:.3}", sensors.accelerometer.y));
                ui.label(format!("Z: {:.3}", sensors.accelerometer.z));
            });
        });

        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.strong("Gyroscope");
                ui.label(format!("X: {:.3}", sensors.gyro.x));
                ui.label(format!("Y: {:.3}", sensors.gyro.y));
                ui.label(format!("Z: {:.3}", sensors.gyro.z));
            });
        });

        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.strong("Tilt");
                ui.label(format!("Angle X: {:.2}°", sensors.tilt.angle_x));
                ui.label(format!("Angle Y: {:.2}°", sensors.tilt.angle_y));
                ui.label(format!("Max: {:.2}°", sensors.tilt.max_tilt));
            });
        });

        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.strong("Environment");
                ui.label(format!(
                    "Soil moisture: {:.1}{}",
                    units.soil_moisture.to_display(sensors.soil_moisture),
                    units.soil_moisture.suffix()
                ));
                ui.label(format!(
                    "Rainfall: {:.1}{}",
                    units.rainfall.to_display(sensors.rainfall),
                    units.rainfall.suffix()
                ));
                ui.label(format!("Temperature: {:.1}°C", sensors.temperature));
                ui.label(format!("Vibration RMS: {:.3}", sensors.vibration_rms));
            });
        });

        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.strong("Status");
                ui.colored_label(
                    risk_color(status.landslide_risk),
                    RichText::new(status.landslide_risk.as_str().to_uppercase()).strong(),
                );
                if status.alert_triggered {
                    ui.colored_label(Color32::from_rgb(200, 0, 0), "Alert: ACTIVE");
                } else {
                    ui.label("Alert: inactive");
                }
                ui.label(format!("Updated: {}", format_datetime(latest.received_at_ms)));
                if let Some(device_id) = &latest.snapshot.device_id {
                    ui.label(format!("Device: {}", device_id));
                }
            });
        });
    });
}
