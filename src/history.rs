use crate::types::{HistoryCursor, HistoryPage, HistoryRecord};
use crate::utils::format_datetime;

/// 正在等待的翻页请求
#[derive(Debug, Clone, Copy, PartialEq)]
enum Navigation {
    First,
    Next(HistoryCursor),
    Previous,
}

/// 历史分页导航
///
/// Keeps a stack of the cursors each visited page started from, so that
/// *Previous* returns to the page actually seen before instead of the first
/// page. The stack only changes when a page arrives.
#[derive(Debug, Clone)]
pub struct HistoryPager {
    page_size: usize,
    // 每一页的起始游标，第一页为 None
    starts: Vec<Option<HistoryCursor>>,
    current: Option<HistoryPage>,
    pending: Option<Navigation>,
    error: Option<String>,
}

impl HistoryPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            starts: Vec::new(),
            current: None,
            pending: None,
            error: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 请求第一页，游标为空
    pub fn request_first(&mut self) {
        self.pending = Some(Navigation::First);
    }

    /// 请求下一页，返回要发送的游标；当前页不满时返回 None
    pub fn request_next(&mut self) -> Option<HistoryCursor> {
        if !self.has_more() || self.is_loading() {
            return None;
        }
        let cursor = self.current.as_ref().and_then(|page| page.cursor)?;
        self.pending = Some(Navigation::Next(cursor));
        Some(cursor)
    }

    /// 请求上一页，返回它的起始游标（第一页为 `Some(None)`）
    pub fn request_previous(&mut self) -> Option<Option<HistoryCursor>> {
        if !self.has_previous() || self.is_loading() {
            return None;
        }
        let start = self.starts[self.starts.len() - 2];
        self.pending = Some(Navigation::Previous);
        Some(start)
    }

    /// 收到数据库返回的页面
    pub fn receive(&mut self, result: Result<HistoryPage, String>) {
        let Some(navigation) = self.pending.take() else {
            return;
        };
        match result {
            Ok(page) => {
                match navigation {
                    Navigation::First => {
                        self.starts.clear();
                        self.starts.push(None);
                    }
                    Navigation::Next(cursor) => self.starts.push(Some(cursor)),
                    Navigation::Previous => {
                        self.starts.pop();
                    }
                }
                self.current = Some(page);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e);
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// 从 1 开始的页码
    pub fn page_number(&self) -> usize {
        self.starts.len().max(1)
    }

    pub fn has_more(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|page| page.is_full(self.page_size))
    }

    pub fn has_previous(&self) -> bool {
        self.starts.len() > 1
    }

    pub fn records(&self) -> &[HistoryRecord] {
        self.current
            .as_ref()
            .map(|page| page.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// 在当前页内按风险等级或时间过滤（不区分大小写）
pub fn filter_records<'a>(records: &'a [HistoryRecord], term: &str) -> Vec<&'a HistoryRecord> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            let risk = record.snapshot.status.landslide_risk.as_str();
            risk.contains(&term) || format_datetime(record.received_at_ms).to_lowercase().contains(&term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LandslideRisk, RiskStatus, SensorReadings, SensorSnapshot, Tilt, Triaxial};

    fn record(id: i64, received_at_ms: i64, risk: LandslideRisk) -> HistoryRecord {
        HistoryRecord {
            id,
            received_at_ms,
            snapshot: SensorSnapshot {
                sensors: SensorReadings {
                    accelerometer: Triaxial::default(),
                    gyro: Triaxial::default(),
                    tilt: Tilt::default(),
                    soil_moisture: 50.0,
                    rainfall: 10.0,
                    temperature: 25.0,
                    vibration_rms: 0.0,
                },
                status: RiskStatus {
                    landslide_risk: risk,
                    alert_triggered: false,
                },
                timestamp: None,
                device_id: None,
            },
        }
    }

    fn page(ids: std::ops::Range<i64>) -> HistoryPage {
        HistoryPage::new(ids.rev().map(|id| record(id, id * 1000, LandslideRisk::Safe)).collect())
    }

    #[test]
    fn test_first_page_without_more() {
        let mut pager = HistoryPager::new(3);
        pager.request_first();
        assert!(pager.is_loading());

        pager.receive(Ok(page(0..2)));
        assert_eq!(pager.page_number(), 1);
        assert!(!pager.has_more());
        assert!(!pager.has_previous());
        assert_eq!(pager.request_next(), None);
    }

    #[test]
    fn test_next_uses_last_row_cursor() {
        let mut pager = HistoryPager::new(3);
        pager.request_first();
        pager.receive(Ok(page(7..10)));

        let cursor = pager.request_next().unwrap();
        assert_eq!(cursor, HistoryCursor { received_at_ms: 7000, id: 7 });
        pager.receive(Ok(page(4..7)));
        assert_eq!(pager.page_number(), 2);
        assert!(pager.has_previous());
    }

    #[test]
    fn test_previous_returns_to_page_actually_seen() {
        let mut pager = HistoryPager::new(3);
        pager.request_first();
        pager.receive(Ok(page(7..10)));
        pager.request_next();
        pager.receive(Ok(page(4..7)));
        pager.request_next();
        pager.receive(Ok(page(1..4)));
        assert_eq!(pager.page_number(), 3);

        // 回到第二页：起始游标是第一页最后一行
        let start = pager.request_previous().unwrap();
        assert_eq!(start, Some(HistoryCursor { received_at_ms: 7000, id: 7 }));
        pager.receive(Ok(page(4..7)));
        assert_eq!(pager.page_number(), 2);

        let start = pager.request_previous().unwrap();
        assert_eq!(start, None);
        pager.receive(Ok(page(7..10)));
        assert_eq!(pager.page_number(), 1);
        assert_eq!(pager.request_previous(), None);
    }

    #[test]
    fn test_error_keeps_current_page() {
        let mut pager = HistoryPager::new(3);
        pager.request_first();
        pager.receive(Ok(page(7..10)));
        pager.request_next();
        pager.receive(Err("disk gone".to_string()));

        assert_eq!(pager.error(), Some("disk gone"));
        assert_eq!(pager.page_number(), 1);
        assert_eq!(pager.records().len(), 3);
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_failed_previous_keeps_position() {
        let mut pager = HistoryPager::new(3);
        pager.request_first();
        pager.receive(Ok(page(7..10)));
        pager.request_next();
        pager.receive(Ok(page(4..7)));

        pager.request_previous();
        pager.receive(Err("busy".to_string()));
        assert_eq!(pager.page_number(), 2);
        assert_eq!(pager.request_previous(), Some(None));
    }

    #[test]
    fn test_unrequested_response_is_ignored() {
        let mut pager = HistoryPager::new(3);
        pager.receive(Ok(page(0..3)));
        assert!(pager.records().is_empty());
    }

    #[test]
    fn test_filter_by_risk_is_case_insensitive() {
        let records = vec![
            record(1, 1_000, LandslideRisk::Safe),
            record(2, 2_000, LandslideRisk::Danger),
            record(3, 3_000, LandslideRisk::Warning),
        ];
        let hits = filter_records(&records, "DANG");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
        assert_eq!(filter_records(&records, "  ").len(), 3);
    }

    #[test]
    fn test_filter_by_formatted_time() {
        let records = vec![record(1, 1_000, LandslideRisk::Safe)];
        let stamp = format_datetime(1_000);
        assert_eq!(filter_records(&records, &stamp[..10]).len(), 1);
        assert!(filter_records(&records, "no-such-day").is_empty());
    }
}
