use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};

use crate::config::{PlotColors, PlotConfig};
use crate::types::{AxisSample, ScalarSample, Timestamped};
use crate::utils::seconds_since;
use crate::window::SlidingWindow;

/// 格式化数字为固定宽度的 y 轴标签
fn format_fixed_width_y_label(value: f64) -> String {
    let abs_value = value.abs();
    if abs_value >= 1000.0 {
        format!("{:-6.1e}", value)
    } else if abs_value >= 100.0 {
        format!("{:-6.0}", value)
    } else if abs_value >= 10.0 {
        format!("{:-6.1}", value)
    } else {
        format!("{:-6.2}", value)
    }
}

fn rgb(color: [u8; 3]) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}

/// 以窗口可见区间的起点为 0 的点列
pub fn series_points<T, F>(window: &SlidingWindow<T>, value: F) -> Vec<[f64; 2]>
where
    T: Timestamped,
    F: Fn(&T) -> f64,
{
    let Some((origin, _)) = window.visible_domain() else {
        return Vec::new();
    };
    window
        .iter()
        .map(|sample| [seconds_since(origin, sample.timestamp_ms()), value(sample)])
        .collect()
}

/// 动态 Y 轴范围，上下各留 5% 边距
pub fn value_range<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| (min.min(v), max.max(v)));
    if min > max {
        return None;
    }
    let range = (max - min).max(0.1);
    Some((min - range * 0.05, max + range * 0.05))
}

/// 横轴范围来自窗口的可见区间；只有一个点时给一秒宽度
fn x_span<T: Timestamped>(window: &SlidingWindow<T>) -> f64 {
    window
        .visible_domain()
        .map(|(first, last)| seconds_since(first, last))
        .filter(|span| *span > 0.0)
        .unwrap_or(1.0)
}

/// 三轴图（加速度、角速度）
pub fn plot_triaxial(ui: &mut egui::Ui, id: &str, window: &SlidingWindow<AxisSample>, config: &PlotConfig) {
    if window.is_empty() {
        ui.label("Waiting for data...");
        return;
    }

    let colors = &config.colors;
    let series: [(&str, Color32, fn(&AxisSample) -> f64); 3] = [
        ("X", rgb(colors.x_axis), |s| s.x),
        ("Y", rgb(colors.y_axis), |s| s.y),
        ("Z", rgb(colors.z_axis), |s| s.z),
    ];

    let Some((y_min, y_max)) = value_range(window.iter().flat_map(|s| [s.x, s.y, s.z])) else {
        return;
    };
    let x_max = x_span(window);

    Plot::new(id)
        .height(config.plot_height)
        .legend(Legend::default())
        .x_axis_formatter(|v, _| format!("{:.0}s", v.value))
        .y_axis_formatter(|v, _| format_fixed_width_y_label(v.value))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([0.0, y_min], [x_max, y_max]));
            for (name, color, value) in series {
                let points = series_points(window, value);
                plot_ui.line(Line::new(name, PlotPoints::from(points)).color(color).width(1.5));
            }
        });
}

/// 环境单值图
pub fn plot_scalar(
    ui: &mut egui::Ui,
    id: &str,
    name: &str,
    window: &SlidingWindow<ScalarSample>,
    color: [u8; 3],
    height: f32,
) {
    if window.is_empty() {
        ui.label("Waiting for data...");
        return;
    }

    let Some((y_min, y_max)) = value_range(window.iter().map(|s| s.value)) else {
        return;
    };
    let x_max = x_span(window);

    Plot::new(id)
        .height(height)
        .x_axis_formatter(|v, _| format!("{:.0}s", v.value))
        .y_axis_formatter(|v, _| format_fixed_width_y_label(v.value))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([0.0, y_min], [x_max, y_max]));
            let points = series_points(window, |s| s.value);
            plot_ui.line(Line::new(name, PlotPoints::from(points)).color(rgb(color)).width(1.5));
        });
}

/// 环境序列的配色
pub fn environment_colors(colors: &PlotColors) -> [[u8; 3]; 3] {
    [colors.soil_moisture, colors.rainfall, colors.temperature]
}
