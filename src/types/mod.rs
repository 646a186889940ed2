pub mod feed;
pub mod history;
pub mod sample;
pub mod snapshot;
pub mod tasks;

pub use feed::FeedEvent;
pub use history::{HistoryCursor, HistoryPage, HistoryRecord};
pub use sample::{AxisSample, ScalarSample, Timestamped};
pub use snapshot::{LandslideRisk, ReceivedSnapshot, RiskStatus, SensorReadings, SensorSnapshot, Tilt, Triaxial};
pub use tasks::{DatabaseTask, PageResult};
