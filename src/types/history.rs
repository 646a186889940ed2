use super::snapshot::SensorSnapshot;

/// 历史表中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: i64,
    pub received_at_ms: i64,
    pub snapshot: SensorSnapshot,
}

impl HistoryRecord {
    pub fn cursor(&self) -> HistoryCursor {
        HistoryCursor {
            received_at_ms: self.received_at_ms,
            id: self.id,
        }
    }
}

/// 分页游标：上一页最后一行的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCursor {
    pub received_at_ms: i64,
    pub id: i64,
}

/// One page of history, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPage {
    pub records: Vec<HistoryRecord>,
    /// Cursor of the last record in `records`; `None` when the page is empty.
    pub cursor: Option<HistoryCursor>,
}

impl HistoryPage {
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        let cursor = records.last().map(HistoryRecord::cursor);
        Self { records, cursor }
    }

    /// 满页说明后面可能还有数据
    pub fn is_full(&self, page_size: usize) -> bool {
        self.records.len() >= page_size && self.cursor.is_some()
    }
}
