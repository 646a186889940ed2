use duckdb::{Connection, Result as DuckResult};
use log::info;

pub struct DatabaseSchema;

impl DatabaseSchema {
    pub fn create_tables(conn: &Connection) -> DuckResult<()> {
        conn.execute("CREATE SEQUENCE IF NOT EXISTS sensor_history_seq", [])?;

        // 保存上游原始数值，单位换算只在展示时进行
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sensor_history (
                id BIGINT PRIMARY KEY DEFAULT nextval('sensor_history_seq'),
                received_at_ms BIGINT NOT NULL,
                device_id VARCHAR,
                source_timestamp VARCHAR,
                accel_x DOUBLE,
                accel_y DOUBLE,
                accel_z DOUBLE,
                gyro_x DOUBLE,
                gyro_y DOUBLE,
                gyro_z DOUBLE,
                tilt_x DOUBLE,
                tilt_y DOUBLE,
                max_tilt DOUBLE,
                soil_moisture DOUBLE,
                rainfall DOUBLE,
                temperature DOUBLE,
                vibration_rms DOUBLE,
                landslide_risk VARCHAR,
                alert_triggered BOOLEAN,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sensor_history_received
             ON sensor_history (received_at_ms, id)",
            [],
        )?;

        info!("sensor_history table ready");
        Ok(())
    }
}
