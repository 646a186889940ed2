use nalgebra::{Rotation3, Vector3};

use crate::config::OrientationConfig;
use crate::types::Triaxial;

/// 线性插值 `a + (b - a) * t`
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// 姿态指示器的三轴角度（弧度），不做归一化，会一直累加
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Orientation {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 按 X、Y、Z 顺序组合的旋转矩阵，用于绘制立方体
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), self.x)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.y)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.z)
    }
}

/// Open-loop smoothed integrator for the rotating indicator.
///
/// Each step moves the current angles a fraction `alpha` of the way towards
/// `current + rate * sensitivity`. There is no drift correction and no
/// absolute reference; the indicator is cosmetic.
#[derive(Debug, Clone)]
pub struct OrientationIntegrator {
    state: Orientation,
    sensitivity: f64,
    alpha: f64,
    latest_rate: Option<Triaxial>,
    stepped_since_tick: bool,
}

impl OrientationIntegrator {
    pub fn new(sensitivity: f64, alpha: f64) -> Self {
        Self {
            state: Orientation::default(),
            sensitivity,
            alpha,
            latest_rate: None,
            stepped_since_tick: false,
        }
    }

    pub fn from_config(config: &OrientationConfig) -> Self {
        Self::new(config.sensitivity, config.alpha)
    }

    pub fn orientation(&self) -> Orientation {
        self.state
    }

    /// 单步目标：当前角度加上角速度乘以灵敏度
    pub fn target_for(&self, rate: &Triaxial) -> Orientation {
        Orientation::new(
            self.state.x + rate.x * self.sensitivity,
            self.state.y + rate.y * self.sensitivity,
            self.state.z + rate.z * self.sensitivity,
        )
    }

    pub fn integrate(&mut self, rate: &Triaxial) -> Orientation {
        let target = self.target_for(rate);
        self.state = Orientation::new(
            lerp(self.state.x, target.x, self.alpha),
            lerp(self.state.y, target.y, self.alpha),
            lerp(self.state.z, target.z, self.alpha),
        );
        self.state
    }

    /// 收到新快照：记录角速度并积分一次
    pub fn observe(&mut self, rate: &Triaxial) -> Orientation {
        self.latest_rate = Some(*rate);
        self.stepped_since_tick = true;
        self.integrate(rate)
    }

    /// 每帧调用一次。本帧已有推送积分过则跳过，否则用最近的角速度继续插值；
    /// 从未收到数据时不更新。
    pub fn tick(&mut self) -> Option<Orientation> {
        if std::mem::take(&mut self.stepped_since_tick) {
            return Some(self.state);
        }
        let rate = self.latest_rate?;
        Some(self.integrate(&rate))
    }

    pub fn reset(&mut self) {
        self.state = Orientation::default();
        self.latest_rate = None;
        self.stepped_since_tick = false;
    }
}
