use log::{debug, info, warn};

use crate::config::{OrientationConfig, PlotConfig, UnitConfig};
use crate::orientation::{Orientation, OrientationIntegrator};
use crate::types::{AxisSample, FeedEvent, ReceivedSnapshot, ScalarSample, SensorReadings};
use crate::window::SlidingWindow;

/// 实时数据源的状态
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    /// 还没有收到第一条推送
    Loading,
    Live,
    DataNotFound,
    ConnectionLost(String),
}

impl FeedStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, FeedStatus::DataNotFound | FeedStatus::ConnectionLost(_))
    }

    pub fn message(&self) -> String {
        match self {
            FeedStatus::Loading => "Loading data...".to_string(),
            FeedStatus::Live => "Live".to_string(),
            FeedStatus::DataNotFound => "Data not found".to_string(),
            FeedStatus::ConnectionLost(reason) => format!("Connection error: {}", reason),
        }
    }
}

/// 环境单值序列，单位在写入时按约定换算
#[derive(Debug, Clone)]
pub struct EnvironmentSeries {
    pub soil_moisture: SlidingWindow<ScalarSample>,
    pub rainfall: SlidingWindow<ScalarSample>,
    pub temperature: SlidingWindow<ScalarSample>,
}

impl EnvironmentSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            soil_moisture: SlidingWindow::new(capacity),
            rainfall: SlidingWindow::new(capacity),
            temperature: SlidingWindow::new(capacity),
        }
    }

    pub fn append(&mut self, timestamp_ms: i64, readings: &SensorReadings, units: &UnitConfig) {
        self.soil_moisture
            .append(ScalarSample::new(timestamp_ms, units.soil_moisture.to_display(readings.soil_moisture)));
        self.rainfall
            .append(ScalarSample::new(timestamp_ms, units.rainfall.to_display(readings.rainfall)));
        self.temperature
            .append(ScalarSample::new(timestamp_ms, readings.temperature));
    }

    pub fn clear(&mut self) {
        self.soil_moisture.clear();
        self.rainfall.clear();
        self.temperature.clear();
    }
}

/// 实时面板的全部派生状态
///
/// Every accepted push appends exactly once to each window and integrates the
/// orientation exactly once. The latest snapshot is last-write-wins.
#[derive(Debug, Clone)]
pub struct LiveDashboard {
    status: FeedStatus,
    latest: Option<ReceivedSnapshot>,
    acceleration: SlidingWindow<AxisSample>,
    gyroscope: SlidingWindow<AxisSample>,
    environment: EnvironmentSeries,
    orientation: OrientationIntegrator,
    units: UnitConfig,
    alert_active: bool,
    received_count: u64,
}

impl LiveDashboard {
    pub fn new(plot: &PlotConfig, orientation: &OrientationConfig, units: UnitConfig) -> Self {
        Self {
            status: FeedStatus::Loading,
            latest: None,
            acceleration: SlidingWindow::new(plot.live_window_capacity),
            gyroscope: SlidingWindow::new(plot.live_window_capacity),
            environment: EnvironmentSeries::new(plot.environment_window_capacity),
            orientation: OrientationIntegrator::from_config(orientation),
            units,
            alert_active: false,
            received_count: 0,
        }
    }

    pub fn handle_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot(received) => self.ingest(received),
            FeedEvent::DataNotFound => {
                warn!("Feed reported no data");
                self.status = FeedStatus::DataNotFound;
            }
            FeedEvent::ConnectionLost(reason) => {
                warn!("Feed connection lost: {}", reason);
                self.status = FeedStatus::ConnectionLost(reason);
            }
        }
    }

    fn ingest(&mut self, received: ReceivedSnapshot) {
        let timestamp_ms = received.received_at_ms;
        let sensors = &received.snapshot.sensors;

        self.acceleration
            .append(AxisSample::from_reading(timestamp_ms, &sensors.accelerometer));
        self.gyroscope
            .append(AxisSample::from_reading(timestamp_ms, &sensors.gyro));
        self.environment.append(timestamp_ms, sensors, &self.units);
        self.orientation.observe(&sensors.gyro);

        let status = &received.snapshot.status;
        if status.alert_triggered && !self.alert_active {
            warn!("Alert triggered, landslide risk: {}", status.landslide_risk);
        } else if !status.alert_triggered && self.alert_active {
            info!("Alert cleared, landslide risk: {}", status.landslide_risk);
        }
        self.alert_active = status.alert_triggered;

        if self.status != FeedStatus::Live {
            info!("Live feed established");
        }
        self.status = FeedStatus::Live;
        self.received_count += 1;
        debug!("Snapshot #{} ingested at {}", self.received_count, timestamp_ms);

        self.latest = Some(received);
    }

    /// 帧回调：推进姿态插值
    pub fn tick(&mut self) -> Option<Orientation> {
        self.orientation.tick()
    }

    /// 重新挂载时清空所有派生状态
    pub fn reset(&mut self) {
        self.status = FeedStatus::Loading;
        self.latest = None;
        self.acceleration.clear();
        self.gyroscope.clear();
        self.environment.clear();
        self.orientation.reset();
        self.alert_active = false;
        self.received_count = 0;
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn latest(&self) -> Option<&ReceivedSnapshot> {
        self.latest.as_ref()
    }

    pub fn acceleration(&self) -> &SlidingWindow<AxisSample> {
        &self.acceleration
    }

    pub fn gyroscope(&self) -> &SlidingWindow<AxisSample> {
        &self.gyroscope
    }

    pub fn environment(&self) -> &EnvironmentSeries {
        &self.environment
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation.orientation()
    }

    pub fn units(&self) -> &UnitConfig {
        &self.units
    }

    pub fn alert_active(&self) -> bool {
        self.alert_active
    }

    pub fn received_count(&self) -> u64 {
        self.received_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitContract;
    use crate::types::{LandslideRisk, RiskStatus, SensorSnapshot, Tilt, Triaxial};

    fn snapshot(accel_x: f64, gyro_x: f64, alert: bool) -> SensorSnapshot {
        SensorSnapshot {
            sensors: SensorReadings {
                accelerometer: Triaxial::new(accel_x, 0.0, 9.8),
                gyro: Triaxial::new(gyro_x, 0.0, 0.0),
                tilt: Tilt::default(),
                soil_moisture: 0.4,
                rainfall: 12.0,
                temperature: 24.0,
                vibration_rms: 0.1,
            },
            status: RiskStatus {
                landslide_risk: if alert { LandslideRisk::Danger } else { LandslideRisk::Safe },
                alert_triggered: alert,
            },
            timestamp: None,
            device_id: None,
        }
    }

    fn dashboard(live_capacity: usize) -> LiveDashboard {
        let plot = PlotConfig {
            live_window_capacity: live_capacity,
            environment_window_capacity: 2,
            ..PlotConfig::default()
        };
        let units = UnitConfig {
            soil_moisture: UnitContract::Fraction,
            rainfall: UnitContract::Millimetres,
        };
        LiveDashboard::new(&plot, &OrientationConfig::default(), units)
    }

    fn push(dashboard: &mut LiveDashboard, t: i64, accel_x: f64) {
        dashboard.handle_event(FeedEvent::Snapshot(ReceivedSnapshot::new(snapshot(accel_x, 1.0, false), t)));
    }

    #[test]
    fn test_starts_loading_without_data() {
        let mut dashboard = dashboard(3);
        assert_eq!(dashboard.status(), &FeedStatus::Loading);
        assert!(dashboard.latest().is_none());
        assert_eq!(dashboard.tick(), None);
    }

    #[test]
    fn test_six_pushes_into_window_of_three() {
        let mut dashboard = dashboard(3);
        for (t, x) in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0].iter().enumerate() {
            push(&mut dashboard, t as i64, *x);
        }

        let kept: Vec<(i64, f64)> = dashboard
            .acceleration()
            .iter()
            .map(|s| (s.timestamp_ms, s.x))
            .collect();
        assert_eq!(kept, vec![(3, 4.0), (4, 5.0), (5, 6.0)]);
        assert_eq!(dashboard.acceleration().visible_domain(), Some((3, 5)));
        assert_eq!(dashboard.gyroscope().len(), 3);
        assert_eq!(dashboard.environment().temperature.len(), 2);
        assert_eq!(dashboard.received_count(), 6);
    }

    #[test]
    fn test_each_push_integrates_once() {
        let mut dashboard = dashboard(3);
        push(&mut dashboard, 0, 0.0);
        let after_one = dashboard.orientation().x;
        assert!((after_one - 0.005).abs() < 1e-12);

        // 同一帧内已积分，tick 不再推进
        dashboard.tick();
        assert_eq!(dashboard.orientation().x, after_one);
        // 下一帧继续朝目标插值
        dashboard.tick();
        assert!(dashboard.orientation().x > after_one);
    }

    #[test]
    fn test_units_applied_at_ingestion() {
        let mut dashboard = dashboard(3);
        push(&mut dashboard, 0, 0.0);
        let soil = dashboard.environment().soil_moisture.latest().unwrap().value;
        let rain = dashboard.environment().rainfall.latest().unwrap().value;
        assert!((soil - 40.0).abs() < 1e-9);
        assert_eq!(rain, 12.0);
    }

    #[test]
    fn test_all_zero_snapshot_is_ingested() {
        let mut dashboard = dashboard(3);
        let mut zero = snapshot(0.0, 0.0, false);
        zero.sensors.accelerometer = Triaxial::default();
        zero.sensors.soil_moisture = 0.0;
        dashboard.handle_event(FeedEvent::Snapshot(ReceivedSnapshot::new(zero, 10)));

        assert_eq!(dashboard.status(), &FeedStatus::Live);
        assert_eq!(dashboard.acceleration().len(), 1);
    }

    #[test]
    fn test_data_not_found_appends_nothing() {
        let mut dashboard = dashboard(3);
        dashboard.handle_event(FeedEvent::DataNotFound);

        assert_eq!(dashboard.status(), &FeedStatus::DataNotFound);
        assert!(dashboard.acceleration().is_empty());
        assert!(dashboard.gyroscope().is_empty());
        assert!(dashboard.environment().soil_moisture.is_empty());
        assert!(dashboard.latest().is_none());
    }

    #[test]
    fn test_connection_error_keeps_message() {
        let mut dashboard = dashboard(3);
        dashboard.handle_event(FeedEvent::ConnectionLost("refused".to_string()));
        assert!(dashboard.status().is_error());
        assert_eq!(dashboard.status().message(), "Connection error: refused");
    }

    #[test]
    fn test_latest_snapshot_is_last_write() {
        let mut dashboard = dashboard(3);
        push(&mut dashboard, 1, 1.0);
        push(&mut dashboard, 2, 2.0);
        let latest = dashboard.latest().unwrap();
        assert_eq!(latest.received_at_ms, 2);
        assert_eq!(latest.snapshot.sensors.accelerometer.x, 2.0);
    }

    #[test]
    fn test_alert_state_follows_snapshots() {
        let mut dashboard = dashboard(3);
        dashboard.handle_event(FeedEvent::Snapshot(ReceivedSnapshot::new(snapshot(0.0, 0.0, true), 1)));
        assert!(dashboard.alert_active());
        dashboard.handle_event(FeedEvent::Snapshot(ReceivedSnapshot::new(snapshot(0.0, 0.0, false), 2)));
        assert!(!dashboard.alert_active());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut dashboard = dashboard(3);
        push(&mut dashboard, 1, 1.0);
        dashboard.reset();

        assert_eq!(dashboard.status(), &FeedStatus::Loading);
        assert!(dashboard.acceleration().is_empty());
        assert_eq!(dashboard.orientation(), Orientation::default());
        assert_eq!(dashboard.received_count(), 0);
    }
}
