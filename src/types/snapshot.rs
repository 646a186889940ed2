use serde::{Deserialize, Serialize};
use std::fmt;

/// 设备推送的一次完整读数（传感器 + 状态）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub sensors: SensorReadings,
    pub status: RiskStatus,
    // 设备端时间，格式不统一，仅作展示
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, rename = "deviceId", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReadings {
    pub accelerometer: Triaxial,
    // 旧版固件不发送陀螺仪数据
    #[serde(default)]
    pub gyro: Triaxial,
    pub tilt: Tilt,
    pub soil_moisture: f64,
    pub rainfall: f64,
    pub temperature: f64,
    #[serde(default, rename = "vibrationRMS")]
    pub vibration_rms: f64,
}

/// 三轴读数：加速度 m/s²，角速度 rad/s
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Triaxial {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Triaxial {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tilt {
    pub angle_x: f64,
    pub angle_y: f64,
    #[serde(default)]
    pub max_tilt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskStatus {
    pub landslide_risk: LandslideRisk,
    pub alert_triggered: bool,
}

/// 上游计算的滑坡风险等级，本系统只负责展示
///
/// Decoding goes through [`LandslideRisk::from_label`], so the wire and the
/// history store accept the same spellings regardless of case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LandslideRisk {
    #[default]
    Safe,
    Warning,
    Danger,
    Unknown,
}

impl LandslideRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            LandslideRisk::Safe => "safe",
            LandslideRisk::Warning => "warning",
            LandslideRisk::Danger => "danger",
            LandslideRisk::Unknown => "unknown",
        }
    }

    /// 解析等级字符串（忽略大小写，支持设备的印尼语代码）
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "safe" | "aman" => LandslideRisk::Safe,
            "warning" | "waspada" => LandslideRisk::Warning,
            "danger" | "awas" => LandslideRisk::Danger,
            _ => LandslideRisk::Unknown,
        }
    }
}

impl From<String> for LandslideRisk {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl fmt::Display for LandslideRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 订阅线程收到的快照，附带接收时间（毫秒）
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedSnapshot {
    pub snapshot: SensorSnapshot,
    pub received_at_ms: i64,
}

impl ReceivedSnapshot {
    pub fn new(snapshot: SensorSnapshot, received_at_ms: i64) -> Self {
        Self {
            snapshot,
            received_at_ms,
        }
    }
}
