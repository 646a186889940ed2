use crossbeam_channel::{bounded, TrySendError};
use log::{info, warn};

use crate::app::app_core::SensorDashboardApp;
use crate::types::{DatabaseTask, HistoryCursor};

pub struct HistoryHandler;

impl HistoryHandler {
    /// 打开面板或刷新时从第一页开始
    pub fn load_first_page(app: &mut SensorDashboardApp) {
        app.state.history.pager.request_first();
        Self::send_page_request(app, None);
        Self::refresh_count(app);
    }

    pub fn load_next_page(app: &mut SensorDashboardApp) {
        if let Some(cursor) = app.state.history.pager.request_next() {
            Self::send_page_request(app, Some(cursor));
        }
    }

    pub fn load_previous_page(app: &mut SensorDashboardApp) {
        if let Some(start) = app.state.history.pager.request_previous() {
            Self::send_page_request(app, start);
        }
    }

    pub fn refresh_count(app: &mut SensorDashboardApp) {
        let (response_sender, response_receiver) = bounded(1);
        let task = DatabaseTask::CountRecords { response_sender };
        if Self::send_task(app, task) {
            app.state.history.count_result_receiver = Some(response_receiver);
        }
    }

    fn send_page_request(app: &mut SensorDashboardApp, cursor: Option<HistoryCursor>) {
        let (response_sender, response_receiver) = bounded(1);
        let task = DatabaseTask::LoadPage {
            cursor,
            page_size: app.state.history.pager.page_size(),
            response_sender,
        };

        if Self::send_task(app, task) {
            app.state.history.page_result_receiver = Some(response_receiver);
            app.state.history.loading_status = "Loading history...".to_string();
            info!("Requested history page after {:?}", cursor);
        } else {
            // 请求没发出去，让分页器回到空闲状态
            app.state
                .history
                .pager
                .receive(Err("History database is unavailable".to_string()));
            app.state.history.loading_status = "History database is unavailable".to_string();
        }
    }

    fn send_task(app: &SensorDashboardApp, task: DatabaseTask) -> bool {
        match app.state.database.db_task_sender.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Database task queue is full");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Database thread is gone");
                false
            }
        }
    }
}
