use chrono::{Local, TimeZone};

fn local_time(timestamp_ms: i64) -> Option<chrono::DateTime<Local>> {
    Local.timestamp_millis_opt(timestamp_ms).single()
}

/// 将毫秒时间戳格式化为本地时间 HH:MM:SS
pub fn format_time(timestamp_ms: i64) -> String {
    match local_time(timestamp_ms) {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => format!("Invalid timestamp: {}", timestamp_ms),
    }
}

/// 完整日期时间，历史表和搜索都用这个格式
pub fn format_datetime(timestamp_ms: i64) -> String {
    match local_time(timestamp_ms) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("Invalid timestamp: {}", timestamp_ms),
    }
}

/// 图表横轴：相对窗口起点的秒数
pub fn seconds_since(origin_ms: i64, timestamp_ms: i64) -> f64 {
    (timestamp_ms - origin_ms) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_shape() {
        let formatted = format_datetime(1_700_000_000_000);
        assert_eq!(formatted.len(), 19);
        assert_eq!(&formatted[4..5], "-");
        assert!(formatted.ends_with(&format_time(1_700_000_000_000)));
    }

    #[test]
    fn test_out_of_range_timestamp() {
        assert!(format_time(i64::MAX).starts_with("Invalid timestamp"));
    }

    #[test]
    fn test_seconds_since_origin() {
        assert_eq!(seconds_since(1_000, 3_500), 2.5);
        assert_eq!(seconds_since(1_000, 1_000), 0.0);
    }
}
