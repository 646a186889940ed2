use super::snapshot::Triaxial;

/// 可按时间排列的样本
pub trait Timestamped {
    fn timestamp_ms(&self) -> i64;
}

/// 三轴图表使用的样本
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSample {
    pub timestamp_ms: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AxisSample {
    pub fn new(timestamp_ms: i64, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp_ms, x, y, z }
    }

    pub fn from_reading(timestamp_ms: i64, reading: &Triaxial) -> Self {
        Self::new(timestamp_ms, reading.x, reading.y, reading.z)
    }
}

impl Timestamped for AxisSample {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}

/// 单值序列（土壤湿度、降雨、温度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSample {
    pub timestamp_ms: i64,
    pub value: f64,
}

impl ScalarSample {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self { timestamp_ms, value }
    }
}

impl Timestamped for ScalarSample {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}
