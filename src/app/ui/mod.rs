pub mod history_panel;
pub mod main_panel;
pub mod orientation_view;
pub mod status_bar;

pub use history_panel::render_history_panel;
pub use main_panel::render_main_panel;
pub use status_bar::render_status_bar;

use eframe::egui::Color32;

use crate::types::LandslideRisk;

/// 风险等级的徽章颜色
pub fn risk_color(risk: LandslideRisk) -> Color32 {
    match risk {
        LandslideRisk::Safe => Color32::from_rgb(0, 150, 0),       // 绿色
        LandslideRisk::Warning => Color32::from_rgb(255, 165, 0),  // 橙色
        LandslideRisk::Danger => Color32::from_rgb(200, 0, 0),     // 红色
        LandslideRisk::Unknown => Color32::GRAY,
    }
}
