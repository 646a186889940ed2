use crossbeam_channel::{Receiver, Sender};

use crate::config::AppConfig;
use crate::dashboard::LiveDashboard;
use crate::history::HistoryPager;
use crate::mqtt::{MqttSource, Subscription};
use crate::ticker::FrameTicker;
use crate::types::{DatabaseTask, FeedEvent, PageResult};

/// 应用状态管理模块
/// 把实时订阅、历史分页和数据库通道分开保存

/// 实时订阅状态
pub struct FeedState {
    pub source: MqttSource,
    pub subscription: Option<Subscription>,
    pub event_receiver: Option<Receiver<FeedEvent>>,
    // 每次订阅都把推送同时交给历史记录线程
    pub history_sender: Sender<FeedEvent>,
    pub channel_capacity: usize,
}

/// 历史面板状态
#[derive(Debug)]
pub struct HistoryState {
    pub show_history_panel: bool,
    pub panel_width: f32,
    pub pager: HistoryPager,
    pub search_term: String,
    pub page_result_receiver: Option<Receiver<PageResult>>,
    pub count_result_receiver: Option<Receiver<usize>>,
    pub record_count: Option<usize>,
    pub loading_status: String,
}

impl HistoryState {
    pub fn new(page_size: usize) -> Self {
        Self {
            show_history_panel: false,
            panel_width: 520.0,
            pager: HistoryPager::new(page_size),
            search_term: String::new(),
            page_result_receiver: None,
            count_result_receiver: None,
            record_count: None,
            loading_status: String::new(),
        }
    }
}

/// 数据库状态
#[derive(Debug, Clone)]
pub struct DatabaseState {
    pub db_task_sender: Sender<DatabaseTask>,
}

/// 统一的应用状态管理
pub struct AppState {
    pub dashboard: LiveDashboard,
    pub ticker: FrameTicker,
    pub feed: FeedState,
    pub history: HistoryState,
    pub database: DatabaseState,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        source: MqttSource,
        db_task_sender: Sender<DatabaseTask>,
        history_sender: Sender<FeedEvent>,
    ) -> Self {
        Self {
            dashboard: LiveDashboard::new(&config.plot, &config.orientation, config.units.clone()),
            ticker: FrameTicker::new(config.orientation.frame_interval()),
            feed: FeedState {
                source,
                subscription: None,
                event_receiver: None,
                history_sender,
                channel_capacity: config.mqtt.channel_capacity,
            },
            history: HistoryState::new(config.database.page_size),
            database: DatabaseState { db_task_sender },
        }
    }

    /// 状态栏显示的摘要
    pub fn get_status_summary(&self) -> String {
        self.dashboard.status().message()
    }
}
