use super::history::{HistoryCursor, HistoryPage};

pub type PageResult = Result<HistoryPage, String>;

/// Requests handled by the database worker thread
#[derive(Clone, Debug)]
pub enum DatabaseTask {
    LoadPage {
        cursor: Option<HistoryCursor>,
        page_size: usize,
        response_sender: crossbeam_channel::Sender<PageResult>,
    },
    CountRecords {
        response_sender: crossbeam_channel::Sender<usize>,
    },
}
