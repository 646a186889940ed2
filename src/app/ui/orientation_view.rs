use eframe::egui::{self, Color32, Pos2, Sense, Stroke, Vec2};
use nalgebra::Vector3;

use crate::orientation::Orientation;

// 立方体的 8 个顶点和 12 条棱
const VERTICES: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// 旋转后的顶点投影到平面（正交投影，y 轴向上）
pub fn project_cube(orientation: &Orientation, center: Pos2, half_size: f32) -> [Pos2; 8] {
    let rotation = orientation.rotation();
    VERTICES.map(|[x, y, z]| {
        let rotated = rotation * Vector3::new(x, y, z);
        Pos2::new(
            center.x + rotated.x as f32 * half_size,
            center.y - rotated.y as f32 * half_size,
        )
    })
}

/// 姿态指示器：跟随积分后的角度旋转的线框立方体
pub fn render_orientation_cube(ui: &mut egui::Ui, orientation: &Orientation, size: f32) {
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 6.0, Color32::from_gray(245));

    let points = project_cube(orientation, rect.center(), size * 0.28);
    let stroke = Stroke::new(2.0, Color32::from_rgb(0, 110, 255));
    for (a, b) in EDGES {
        painter.line_segment([points[a], points[b]], stroke);
    }

    response.on_hover_text(format!(
        "x: {:.2} rad, y: {:.2} rad, z: {:.2} rad",
        orientation.x, orientation.y, orientation.z
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_orientation_projects_square_front_face() {
        let points = project_cube(&Orientation::default(), Pos2::new(50.0, 50.0), 10.0);
        assert_eq!(points[0], Pos2::new(40.0, 60.0));
        assert_eq!(points[2], Pos2::new(60.0, 40.0));
        // 正交投影下前后两个面重合
        assert_eq!(points[0], points[4]);
    }

    #[test]
    fn test_rotation_moves_vertices() {
        let still = project_cube(&Orientation::default(), Pos2::ZERO, 10.0);
        let turned = project_cube(&Orientation::new(0.0, 0.5, 0.0), Pos2::ZERO, 10.0);
        assert_ne!(still[1], turned[1]);
    }
}
