use duckdb::{params, Connection, Row};
use log::{debug, info};
use std::fs;
use std::path::Path;

use super::schema::DatabaseSchema;
use crate::config::DatabaseConfig;
use crate::types::{
    HistoryCursor, HistoryPage, HistoryRecord, LandslideRisk, ReceivedSnapshot, RiskStatus, SensorReadings,
    SensorSnapshot, Tilt, Triaxial,
};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const SELECT_COLUMNS: &str = "SELECT id, received_at_ms, device_id, source_timestamp,
        accel_x, accel_y, accel_z, gyro_x, gyro_y, gyro_z,
        tilt_x, tilt_y, max_tilt, soil_moisture, rainfall, temperature, vibration_rms,
        landslide_risk, alert_triggered
     FROM sensor_history";

pub struct DatabaseManager {
    conn: Connection,
}

impl DatabaseManager {
    pub fn open(config: &DatabaseConfig) -> Result<Self, HistoryError> {
        let db_path = Path::new(&config.path);

        // 确保数据目录存在
        if config.auto_create_dir {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        info!("Database connection established at: {}", db_path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, HistoryError> {
        DatabaseSchema::create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// 在一个事务中写入一批快照
    pub fn insert_snapshots(&mut self, rows: &[ReceivedSnapshot]) -> Result<usize, HistoryError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sensor_history (
                    received_at_ms, device_id, source_timestamp,
                    accel_x, accel_y, accel_z, gyro_x, gyro_y, gyro_z,
                    tilt_x, tilt_y, max_tilt, soil_moisture, rainfall, temperature, vibration_rms,
                    landslide_risk, alert_triggered
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;

            for row in rows {
                let snapshot = &row.snapshot;
                let sensors = &snapshot.sensors;
                stmt.execute(params![
                    row.received_at_ms,
                    snapshot.device_id.as_deref(),
                    snapshot.timestamp.as_deref(),
                    sensors.accelerometer.x,
                    sensors.accelerometer.y,
                    sensors.accelerometer.z,
                    sensors.gyro.x,
                    sensors.gyro.y,
                    sensors.gyro.z,
                    sensors.tilt.angle_x,
                    sensors.tilt.angle_y,
                    sensors.tilt.max_tilt,
                    sensors.soil_moisture,
                    sensors.rainfall,
                    sensors.temperature,
                    sensors.vibration_rms,
                    snapshot.status.landslide_risk.as_str(),
                    snapshot.status.alert_triggered,
                ])?;
            }
        }
        tx.commit()?;

        debug!("Inserted {} history rows", rows.len());
        Ok(rows.len())
    }

    /// 按接收时间倒序分页，游标之后的行（不含游标本身）
    pub fn load_page(&self, cursor: Option<HistoryCursor>, page_size: usize) -> Result<HistoryPage, HistoryError> {
        let limit = page_size.max(1) as i64;

        let records = match cursor {
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} ORDER BY received_at_ms DESC, id DESC LIMIT ?",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![limit], record_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            Some(cursor) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE received_at_ms < ? OR (received_at_ms = ? AND id < ?)
                     ORDER BY received_at_ms DESC, id DESC LIMIT ?",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(
                    params![cursor.received_at_ms, cursor.received_at_ms, cursor.id, limit],
                    record_from_row,
                )?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(HistoryPage::new(records))
    }

    pub fn count(&self) -> Result<usize, HistoryError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM sensor_history", [], |row| row.get::<_, i64>(0))?;
        Ok(count.max(0) as usize)
    }
}

fn record_from_row(row: &Row<'_>) -> duckdb::Result<HistoryRecord> {
    let risk: Option<String> = row.get(17)?;

    Ok(HistoryRecord {
        id: row.get(0)?,
        received_at_ms: row.get(1)?,
        snapshot: SensorSnapshot {
            device_id: row.get(2)?,
            timestamp: row.get(3)?,
            sensors: SensorReadings {
                accelerometer: Triaxial::new(row.get(4)?, row.get(5)?, row.get(6)?),
                gyro: Triaxial::new(row.get(7)?, row.get(8)?, row.get(9)?),
                tilt: Tilt {
                    angle_x: row.get(10)?,
                    angle_y: row.get(11)?,
                    max_tilt: row.get(12)?,
                },
                soil_moisture: row.get(13)?,
                rainfall: row.get(14)?,
                temperature: row.get(15)?,
                vibration_rms: row.get(16)?,
            },
            status: RiskStatus {
                landslide_risk: risk.as_deref().map(LandslideRisk::from_label).unwrap_or_default(),
                alert_triggered: row.get::<_, Option<bool>>(18)?.unwrap_or(false),
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(risk: LandslideRisk, soil_moisture: f64) -> SensorSnapshot {
        SensorSnapshot {
            sensors: SensorReadings {
                accelerometer: Triaxial::new(0.1, -0.2, 9.8),
                gyro: Triaxial::new(0.01, 0.02, -0.03),
                tilt: Tilt {
                    angle_x: 1.5,
                    angle_y: -2.0,
                    max_tilt: 2.0,
                },
                soil_moisture,
                rainfall: 12.5,
                temperature: 26.0,
                vibration_rms: 0.3,
            },
            status: RiskStatus {
                landslide_risk: risk,
                alert_triggered: risk == LandslideRisk::Danger,
            },
            timestamp: Some("2024-01-01T00:00:00Z".to_string()),
            device_id: Some("sensor-001".to_string()),
        }
    }

    fn seeded(times: &[i64]) -> DatabaseManager {
        let mut db = DatabaseManager::open_in_memory().unwrap();
        let rows: Vec<ReceivedSnapshot> = times
            .iter()
            .map(|&t| ReceivedSnapshot::new(snapshot(LandslideRisk::Safe, t as f64), t))
            .collect();
        db.insert_snapshots(&rows).unwrap();
        db
    }

    #[test]
    fn test_insert_and_read_back_raw_values() {
        let mut db = DatabaseManager::open_in_memory().unwrap();
        let original = snapshot(LandslideRisk::Danger, 0.42);
        db.insert_snapshots(&[ReceivedSnapshot::new(original.clone(), 1_000)]).unwrap();

        let page = db.load_page(None, 10).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].received_at_ms, 1_000);
        assert_eq!(page.records[0].snapshot, original);
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut db = DatabaseManager::open_in_memory().unwrap();
        assert_eq!(db.insert_snapshots(&[]).unwrap(), 0);
        let page = db.load_page(None, 10).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.cursor, None);
    }

    #[test]
    fn test_first_page_is_newest_first() {
        let db = seeded(&[1, 2, 3, 4, 5]);
        let page = db.load_page(None, 3).unwrap();
        let times: Vec<i64> = page.records.iter().map(|r| r.received_at_ms).collect();
        assert_eq!(times, vec![5, 4, 3]);
        assert!(page.is_full(3));
    }

    #[test]
    fn test_pages_cover_all_rows_without_overlap() {
        let db = seeded(&[1, 2, 3, 4, 5, 6, 7]);
        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = db.load_page(cursor, 3).unwrap();
            seen.extend(page.records.iter().map(|r| r.received_at_ms));
            if !page.is_full(3) {
                break;
            }
            cursor = page.cursor;
        }
        assert_eq!(seen, vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_equal_receipt_times_break_ties_by_id() {
        let db = seeded(&[10, 10, 10, 10]);
        let first = db.load_page(None, 2).unwrap();
        let second = db.load_page(first.cursor, 2).unwrap();

        let mut ids: Vec<i64> = first.records.iter().chain(second.records.iter()).map(|r| r.id).collect();
        let unique = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), unique);
        assert_eq!(unique, 4);
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_unknown_risk_label_reads_back_as_unknown() {
        let db = seeded(&[5]);
        db.conn
            .execute("UPDATE sensor_history SET landslide_risk = 'mystery'", [])
            .unwrap();
        let record = db.load_page(None, 1).unwrap().records.remove(0);
        assert_eq!(record.snapshot.status.landslide_risk, LandslideRisk::Unknown);
    }
}
