use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 应用配置管理模块
/// 集中管理所有配置项，提供默认值和配置验证

/// 主配置结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub mqtt: MqttConfig,
    pub database: DatabaseConfig,
    pub plot: PlotConfig,
    pub orientation: OrientationConfig,
    pub units: UnitConfig,
}

/// 窗口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub resizable: bool,
    pub vsync: bool,
}

/// MQTT配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    pub qos: u8,
    pub keep_alive_secs: u64,
    // 每个监听者的事件通道容量
    pub channel_capacity: usize,
}

/// 数据库配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub auto_create_dir: bool,
    pub batch_size: usize,
    pub flush_interval_secs: u64,
    pub page_size: usize,
    pub task_channel_capacity: usize,
}

/// 绘图配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub live_window_capacity: usize,
    pub environment_window_capacity: usize,
    pub plot_height: f32,
    pub colors: PlotColors,
}

/// 绘图颜色配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotColors {
    pub x_axis: [u8; 3],
    pub y_axis: [u8; 3],
    pub z_axis: [u8; 3],
    pub soil_moisture: [u8; 3],
    pub rainfall: [u8; 3],
    pub temperature: [u8; 3],
}

/// 姿态指示器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// 角速度到目标角度的比例系数
    pub sensitivity: f64,
    /// 每步插值系数，取值 (0, 1]
    pub alpha: f64,
    pub frame_interval_ms: u64,
}

/// 上游单位约定
///
/// Soil moisture and rainfall are published either as a 0..1 fraction or as
/// an already scaled percentage depending on the firmware revision. The
/// contract is declared here instead of guessed from the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    pub soil_moisture: UnitContract,
    pub rainfall: UnitContract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitContract {
    /// 0..1，显示时乘以 100
    Fraction,
    /// 0..100，原样显示
    Percent,
    /// 毫米，原样显示（仅降雨）
    Millimetres,
}

impl UnitContract {
    pub fn to_display(self, raw: f64) -> f64 {
        match self {
            UnitContract::Fraction => raw * 100.0,
            UnitContract::Percent | UnitContract::Millimetres => raw,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            UnitContract::Fraction | UnitContract::Percent => "%",
            UnitContract::Millimetres => " mm",
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 860.0,
            title: "SlopeWatch - Landslide Monitor".to_string(),
            resizable: true,
            vsync: true,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "localhost".to_string(),
            port: 1883,
            client_id: "slopewatch_dashboard".to_string(),
            topic: "landslide/sensor-001/snapshot".to_string(),
            qos: 1,
            keep_alive_secs: 5,
            channel_capacity: 1000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/sensor_history.db".to_string(),
            auto_create_dir: true,
            batch_size: 100,
            flush_interval_secs: 30,
            page_size: 100,
            task_channel_capacity: 100,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            live_window_capacity: 100,
            environment_window_capacity: 24,
            plot_height: 160.0,
            colors: PlotColors::default(),
        }
    }
}

impl Default for PlotColors {
    fn default() -> Self {
        Self {
            x_axis: [239, 68, 68],      // 红色
            y_axis: [34, 197, 94],      // 绿色
            z_axis: [59, 130, 246],     // 蓝色
            soil_moisture: [0, 110, 255],
            rainfall: [77, 166, 255],
            temperature: [255, 119, 51],
        }
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.05,
            alpha: 0.1,
            frame_interval_ms: 16,
        }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            soil_moisture: UnitContract::Percent,
            rainfall: UnitContract::Percent,
        }
    }
}

impl MqttConfig {
    pub fn qos_level(&self) -> rumqttc::QoS {
        match self.qos {
            0 => rumqttc::QoS::AtMostOnce,
            1 => rumqttc::QoS::AtLeastOnce,
            _ => rumqttc::QoS::ExactlyOnce,
        }
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl DatabaseConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

impl OrientationConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        std::fs::write(path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// 用环境变量覆盖 broker 地址（.env 已由调用方加载）
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("MQTT_HOST") {
            self.mqtt.broker = host;
        }
        if let Ok(port) = env::var("MQTT_PORT") {
            self.mqtt.port = port
                .parse::<u16>()
                .map_err(|e| ConfigError::ValidationError(format!("MQTT_PORT is not a port number: {}", e)))?;
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::ValidationError("Window dimensions must be positive".to_string()));
        }

        if self.mqtt.topic.trim().is_empty() {
            return Err(ConfigError::ValidationError("MQTT topic must not be empty".to_string()));
        }

        if self.mqtt.qos > 2 {
            return Err(ConfigError::ValidationError("MQTT qos must be 0, 1 or 2".to_string()));
        }

        if self.mqtt.keep_alive_secs < 5 {
            return Err(ConfigError::ValidationError("MQTT keep alive must be at least 5 seconds".to_string()));
        }

        if self.mqtt.channel_capacity == 0 || self.database.task_channel_capacity == 0 {
            return Err(ConfigError::ValidationError("Channel capacities must be positive".to_string()));
        }

        if self.plot.live_window_capacity == 0 || self.plot.environment_window_capacity == 0 {
            return Err(ConfigError::ValidationError("Plot window capacities must be at least 1".to_string()));
        }

        if !(self.orientation.alpha > 0.0 && self.orientation.alpha <= 1.0) {
            return Err(ConfigError::ValidationError("Orientation alpha must be in (0, 1]".to_string()));
        }

        if !self.orientation.sensitivity.is_finite() {
            return Err(ConfigError::ValidationError("Orientation sensitivity must be finite".to_string()));
        }

        if self.orientation.frame_interval_ms == 0 {
            return Err(ConfigError::ValidationError("Frame interval must be positive".to_string()));
        }

        if self.database.batch_size == 0 || self.database.page_size == 0 {
            return Err(ConfigError::ValidationError("Batch size and page size must be at least 1".to_string()));
        }

        if self.units.soil_moisture == UnitContract::Millimetres {
            return Err(ConfigError::ValidationError("Soil moisture cannot be measured in millimetres".to_string()));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// 配置管理器
pub struct ConfigManager {
    config: AppConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建配置管理器
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_path: None,
        }
    }

    /// 使用已经构造好的配置（不关联文件）
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from_file(&path)?;
        Ok(Self {
            config,
            config_path: Some(path.as_ref().to_path_buf()),
        })
    }

    /// 文件不存在时使用默认配置，文件无效时报错
    pub fn load_or_default<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            log::info!("Config file {} not found, using defaults", path.as_ref().display());
            Ok(Self {
                config: AppConfig::default(),
                config_path: Some(path.as_ref().to_path_buf()),
            })
        }
    }

    /// 获取当前配置
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取可变配置
    pub fn get_config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// 保存配置
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.config_path {
            self.config.save_to_file(path)?;
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.plot.live_window_capacity, 100);
        assert_eq!(config.plot.environment_window_capacity, 24);
        assert_eq!(config.database.page_size, 100);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.orientation.sensitivity = 0.2;
        config.units.rainfall = UnitContract::Millimetres;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            "[units]\nsoil_moisture = \"fraction\"\n\n[orientation]\nalpha = 0.5\n",
        )
        .unwrap();
        assert_eq!(config.units.soil_moisture, UnitContract::Fraction);
        assert_eq!(config.units.rainfall, UnitContract::Percent);
        assert_eq!(config.orientation.alpha, 0.5);
        assert_eq!(config.orientation.sensitivity, 0.05);
        assert_eq!(config.mqtt.port, 1883);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(manager.get_config(), &AppConfig::default());
    }

    #[test_case(|c: &mut AppConfig| c.orientation.alpha = 0.0; "zero alpha")]
    #[test_case(|c: &mut AppConfig| c.orientation.alpha = 1.5; "alpha above one")]
    #[test_case(|c: &mut AppConfig| c.orientation.sensitivity = f64::NAN; "nan sensitivity")]
    #[test_case(|c: &mut AppConfig| c.plot.live_window_capacity = 0; "empty live window")]
    #[test_case(|c: &mut AppConfig| c.database.page_size = 0; "empty page")]
    #[test_case(|c: &mut AppConfig| c.mqtt.qos = 3; "bad qos")]
    #[test_case(|c: &mut AppConfig| c.mqtt.keep_alive_secs = 1; "short keep alive")]
    #[test_case(|c: &mut AppConfig| c.units.soil_moisture = UnitContract::Millimetres; "soil in mm")]
    fn test_validation_rejects(mutate: fn(&mut AppConfig)) {
        let mut config = AppConfig::default();
        mutate(&mut config);
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_alpha_of_one_is_allowed() {
        let mut config = AppConfig::default();
        config.orientation.alpha = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test_case(UnitContract::Fraction, 0.325, 32.5; "fraction scaled")]
    #[test_case(UnitContract::Percent, 32.5, 32.5; "percent as is")]
    #[test_case(UnitContract::Millimetres, 4.0, 4.0; "millimetres as is")]
    fn test_unit_contract_display(contract: UnitContract, raw: f64, expected: f64) {
        assert!((contract.to_display(raw) - expected).abs() < 1e-9);
    }
}
