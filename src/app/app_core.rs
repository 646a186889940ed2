use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use eframe::{egui, Frame};
use log::info;

use super::handlers::LiveFeedHandler;
use super::state::AppState;
use crate::config::ConfigManager;
use crate::mqtt::MqttSource;
use crate::types::{DatabaseTask, FeedEvent};

// 定时器停止时的兜底刷新间隔
const IDLE_REPAINT: Duration = Duration::from_millis(250);

pub struct SensorDashboardApp {
    // 统一的状态管理
    pub state: AppState,

    // 配置管理
    pub config: ConfigManager,
}

impl SensorDashboardApp {
    /// 创建应用；订阅由调用方通过 [`LiveFeedHandler::mount`] 打开
    pub fn new(
        config: ConfigManager,
        source: MqttSource,
        db_task_sender: Sender<DatabaseTask>,
        history_sender: Sender<FeedEvent>,
    ) -> Self {
        let state = AppState::new(config.get_config(), source, db_task_sender, history_sender);

        info!(
            "Dashboard ready for topic {}",
            state.feed.source.config().topic
        );

        Self { state, config }
    }
}

impl eframe::App for SensorDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 设置明亮模式主题
        ctx.set_visuals(egui::Visuals::light());

        // 先处理数据再渲染，保证本帧显示最新状态
        LiveFeedHandler::drain_events(self);
        let now = Instant::now();
        LiveFeedHandler::advance_frame(self, now);
        self.handle_history_results();

        // 渲染UI组件
        crate::app::ui::render_status_bar(self, ctx);
        crate::app::ui::render_history_panel(self, ctx);
        crate::app::ui::render_main_panel(self, ctx);

        let next_frame = self.state.ticker.time_until_next(now).unwrap_or(IDLE_REPAINT);
        ctx.request_repaint_after(next_frame);
    }
}
