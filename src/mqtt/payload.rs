use serde_json::Value;

use crate::types::SensorSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 解析一次推送。
///
/// 空负载、`null` 和空对象表示数据源没有值，返回 `Ok(None)`；
/// 格式错误的负载整体拒绝。
pub fn decode_snapshot(payload: &[u8]) -> Result<Option<SensorSnapshot>, PayloadError> {
    let payload_str = std::str::from_utf8(payload)?;
    let trimmed = payload_str.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)?;
    match &value {
        Value::Null => return Ok(None),
        Value::Object(map) if map.is_empty() => return Ok(None),
        _ => {}
    }

    Ok(Some(serde_json::from_value(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LandslideRisk;
    use test_case::test_case;

    const ZERO_SNAPSHOT: &str = r#"{
        "sensors": {
            "accelerometer": {"x": 0.0, "y": 0.0, "z": 0.0},
            "gyro": {"x": 0.0, "y": 0.0, "z": 0.0},
            "tilt": {"angleX": 0.0, "angleY": 0.0, "maxTilt": 0.0},
            "soilMoisture": 0.0,
            "rainfall": 0.0,
            "temperature": 0.0,
            "vibrationRMS": 0.0
        },
        "status": {"landslideRisk": "safe", "alertTriggered": false}
    }"#;

    #[test_case(b""; "empty payload")]
    #[test_case(b"   \n"; "whitespace")]
    #[test_case(b"null"; "json null")]
    #[test_case(b"{}"; "empty object")]
    fn test_absent_value(payload: &[u8]) {
        assert!(matches!(decode_snapshot(payload), Ok(None)));
    }

    #[test]
    fn test_all_zero_snapshot_is_a_value() {
        let snapshot = decode_snapshot(ZERO_SNAPSHOT.as_bytes()).unwrap().unwrap();
        assert_eq!(snapshot.sensors.accelerometer.z, 0.0);
        assert_eq!(snapshot.status.landslide_risk, LandslideRisk::Safe);
    }

    #[test_case(b"offline"; "last will text")]
    #[test_case(b"{\"sensors\": {}}"; "missing fields")]
    #[test_case(&[0xff, 0xfe, 0x00]; "bad utf8")]
    fn test_malformed_is_rejected(payload: &[u8]) {
        assert!(decode_snapshot(payload).is_err());
    }
}
