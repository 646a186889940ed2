use std::time::Instant;

use crossbeam_channel::{bounded, TryRecvError};
use log::{error, info};

use crate::app::app_core::SensorDashboardApp;
use crate::types::FeedEvent;

pub struct LiveFeedHandler;

impl LiveFeedHandler {
    /// 挂载：打开订阅并启动帧定时器；已有订阅先释放
    pub fn mount(app: &mut SensorDashboardApp) {
        Self::release_subscription(app);

        let feed = &mut app.state.feed;
        let (event_sender, event_receiver) = bounded(feed.channel_capacity);
        let listeners = vec![event_sender, feed.history_sender.clone()];

        match feed.source.subscribe(listeners) {
            Ok(subscription) => {
                feed.subscription = Some(subscription);
                feed.event_receiver = Some(event_receiver);
                app.state.ticker.start(Instant::now());
                info!("Live dashboard mounted");
            }
            Err(e) => {
                error!("Failed to subscribe: {}", e);
                app.state
                    .dashboard
                    .handle_event(FeedEvent::ConnectionLost(e.to_string()));
            }
        }
    }

    /// 卸载：释放订阅并停止帧定时器
    pub fn unmount(app: &mut SensorDashboardApp) {
        Self::release_subscription(app);
        app.state.ticker.stop();
    }

    fn release_subscription(app: &mut SensorDashboardApp) {
        if let Some(subscription) = app.state.feed.subscription.take() {
            subscription.unsubscribe();
        }
        app.state.feed.event_receiver = None;
    }

    /// 相当于重新挂载：旧的视图状态全部清空
    pub fn reconnect(app: &mut SensorDashboardApp) {
        info!("Reconnecting live feed");
        Self::unmount(app);
        app.state.dashboard.reset();
        Self::mount(app);
    }

    /// 每帧取出所有已到达的事件
    pub fn drain_events(app: &mut SensorDashboardApp) {
        let Some(receiver) = &app.state.feed.event_receiver else {
            return;
        };

        let mut ended = false;
        loop {
            match receiver.try_recv() {
                Ok(event) => app.state.dashboard.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    ended = true;
                    break;
                }
            }
        }

        if ended && !app.state.dashboard.status().is_error() {
            // 订阅线程没有留下原因就结束了
            app.state
                .dashboard
                .handle_event(FeedEvent::ConnectionLost("subscription ended".to_string()));
        }

        if app.state.dashboard.status().is_error() {
            app.state.ticker.stop();
        }
    }

    /// 帧定时器到期时推进姿态插值
    pub fn advance_frame(app: &mut SensorDashboardApp, now: Instant) {
        if app.state.ticker.poll(now) {
            app.state.dashboard.tick();
        }
    }
}
