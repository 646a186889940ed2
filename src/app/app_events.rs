use log::{info, warn};

use super::app_core::SensorDashboardApp;

impl SensorDashboardApp {
    /// 轮询数据库线程返回的分页和计数结果
    pub fn handle_history_results(&mut self) {
        let history = &mut self.state.history;

        if let Some(receiver) = &history.page_result_receiver {
            if let Ok(result) = receiver.try_recv() {
                match &result {
                    Ok(page) => {
                        history.loading_status = format!("Loaded {} records", page.records.len());
                        info!("History page loaded: {} records", page.records.len());
                    }
                    Err(e) => {
                        history.loading_status = e.clone();
                        warn!("History page failed: {}", e);
                    }
                }
                history.pager.receive(result);
                history.page_result_receiver = None; // 清除接收器
            }
        }

        if let Some(receiver) = &history.count_result_receiver {
            if let Ok(count) = receiver.try_recv() {
                history.record_count = Some(count);
                history.count_result_receiver = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::SensorDashboardApp;
    use crate::config::{AppConfig, ConfigManager};
    use crate::mqtt::MqttSource;
    use crate::types::HistoryPage;
    use crossbeam_channel::bounded;

    #[test]
    fn test_page_result_is_handed_to_pager() {
        let (db_tx, _db_rx) = bounded(4);
        let (history_tx, _history_rx) = bounded(4);
        let config = AppConfig::default();
        let source = MqttSource::new(config.mqtt.clone());
        let mut app = SensorDashboardApp::new(ConfigManager::with_config(config), source, db_tx, history_tx);

        app.state.history.pager.request_first();
        let (page_tx, page_rx) = bounded(1);
        page_tx.send(Ok(HistoryPage::default())).unwrap();
        app.state.history.page_result_receiver = Some(page_rx);

        let (count_tx, count_rx) = bounded(1);
        count_tx.send(7).unwrap();
        app.state.history.count_result_receiver = Some(count_rx);

        app.handle_history_results();
        assert!(!app.state.history.pager.is_loading());
        assert!(app.state.history.page_result_receiver.is_none());
        assert_eq!(app.state.history.record_count, Some(7));
        assert_eq!(app.state.history.loading_status, "Loaded 0 records");
    }
}
