use std::env;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::{Sender, TrySendError};
use dotenv::dotenv;
use log::{debug, error, info, warn};
use rumqttc::{Client, Connection, ConnectionError, Event, MqttOptions, Packet};

use super::payload::decode_snapshot;
use crate::config::MqttConfig;
use crate::types::{FeedEvent, ReceivedSnapshot};

// 释放订阅时最多等待工作线程这么久，避免首次连接超时卡住界面
const RELEASE_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("MQTT request failed: {0}")]
    Client(#[from] rumqttc::ClientError),
    #[error("Failed to spawn subscription thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// 推送数据源句柄：启动时显式创建，再交给需要订阅的组件
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttConfig,
    credentials: Option<(String, String)>,
}

impl MqttSource {
    pub fn new(config: MqttConfig) -> Self {
        dotenv().ok(); // 加载 .env 文件

        let credentials = match (env::var("MQTT_USER"), env::var("MQTT_PASS")) {
            (Ok(user), Ok(pass)) => Some((user, pass)),
            _ => None,
        };

        Self { config, credentials }
    }

    pub fn config(&self) -> &MqttConfig {
        &self.config
    }

    /// 按配置构造连接参数；client_id 由调用方决定，便于模拟器使用独立身份
    pub fn options_for(&self, client_id: &str) -> MqttOptions {
        let mut mqtt_options = MqttOptions::new(client_id, self.config.broker.clone(), self.config.port);

        if let Some((user, pass)) = &self.credentials {
            mqtt_options.set_credentials(user.clone(), pass.clone());
        }

        mqtt_options.set_keep_alive(self.config.keep_alive());
        mqtt_options
    }

    /// 打开一个订阅，把每次推送广播给所有监听者。
    ///
    /// The returned handle owns the connection; dropping it or calling
    /// [`Subscription::unsubscribe`] disconnects and joins the worker.
    pub fn subscribe(&self, listeners: Vec<Sender<FeedEvent>>) -> Result<Subscription, SubscriptionError> {
        let (client, connection) = Client::new(self.options_for(&self.config.client_id), 10);
        client.subscribe(self.config.topic.clone(), self.config.qos_level())?;

        info!(
            "Subscribing to {} on {}:{}",
            self.config.topic, self.config.broker, self.config.port
        );

        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_shutdown = Arc::clone(&shutdown);
        let fanout = FeedFanout::new(listeners);

        let handle = thread::Builder::new()
            .name("mqtt-feed".to_string())
            .spawn(move || run_feed_loop(connection, fanout, worker_shutdown))?;

        Ok(Subscription {
            client,
            shutdown,
            handle: Some(handle),
        })
    }
}

/// 活动订阅的句柄
pub struct Subscription {
    client: Client,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// 测试用：包装一个已启动的工作线程，不连接 broker
    #[cfg(test)]
    pub(crate) fn from_worker(handle: JoinHandle<()>, shutdown: Arc<AtomicBool>) -> Self {
        let (client, _connection) = Client::new(MqttOptions::new("slopewatch_test", "127.0.0.1", 1883), 10);
        Self {
            client,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.shutdown.store(true, Ordering::Relaxed);
        // 断开会唤醒阻塞中的事件循环
        if let Err(e) = self.client.disconnect() {
            debug!("Disconnect request not delivered: {}", e);
        }

        let deadline = Instant::now() + RELEASE_TIMEOUT;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }

        if !handle.is_finished() {
            // 仍在连接中；关闭标志已设置，线程醒来后不会再广播
            warn!("MQTT thread still busy, leaving it to exit on its own");
            return;
        }

        match handle.join() {
            Ok(()) => info!("MQTT subscription released"),
            Err(e) => error!("MQTT thread panicked: {:?}", e),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// 把事件复制给每个监听者；断开的监听者会被移除
#[derive(Debug)]
pub struct FeedFanout {
    listeners: Vec<Sender<FeedEvent>>,
}

impl FeedFanout {
    pub fn new(listeners: Vec<Sender<FeedEvent>>) -> Self {
        Self { listeners }
    }

    /// 返回 false 表示已经没有监听者
    pub fn broadcast(&mut self, event: &FeedEvent) -> bool {
        self.listeners.retain(|listener| match listener.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                // 不做背压，丢弃这一条
                warn!("Feed listener is full, dropping event");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
        !self.listeners.is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// 接收时间戳，保证同一订阅内单调不减
#[derive(Debug, Default, Clone)]
pub struct ReceiptClock {
    last_ms: Option<i64>,
}

impl ReceiptClock {
    pub fn stamp(&mut self, now_ms: i64) -> i64 {
        let stamped = match self.last_ms {
            Some(last) => now_ms.max(last),
            None => now_ms,
        };
        self.last_ms = Some(stamped);
        stamped
    }
}

fn run_feed_loop(mut connection: Connection, mut fanout: FeedFanout, shutdown_signal: Arc<AtomicBool>) {
    let mut clock = ReceiptClock::default();

    for event in connection.iter() {
        if dispatch(event, &mut fanout, &mut clock, &shutdown_signal).is_break() {
            break;
        }
    }
}

/// 处理事件循环中的一个事件；返回 Break 表示订阅结束
fn dispatch(
    event: Result<Event, ConnectionError>,
    fanout: &mut FeedFanout,
    clock: &mut ReceiptClock,
    shutdown_signal: &AtomicBool,
) -> ControlFlow<()> {
    // 检查关闭信号
    if shutdown_signal.load(Ordering::Relaxed) {
        info!("MQTT thread received shutdown signal, exiting gracefully");
        return ControlFlow::Break(());
    }

    match event {
        Ok(Event::Incoming(Packet::Publish(publish))) => {
            let received_at_ms = clock.stamp(Utc::now().timestamp_millis());
            match decode_snapshot(&publish.payload) {
                Ok(Some(snapshot)) => {
                    debug!(
                        "Snapshot received: risk={}, alert={}",
                        snapshot.status.landslide_risk, snapshot.status.alert_triggered
                    );
                    let event = FeedEvent::Snapshot(ReceivedSnapshot::new(snapshot, received_at_ms));
                    if !fanout.broadcast(&event) {
                        // 通道断开表示所有监听者都已关闭，优雅退出
                        info!("All feed listeners disconnected, MQTT thread exiting");
                        return ControlFlow::Break(());
                    }
                }
                Ok(None) => {
                    warn!("Topic {} has no value", publish.topic);
                    fanout.broadcast(&FeedEvent::DataNotFound);
                    return ControlFlow::Break(());
                }
                Err(e) => warn!("Invalid sensor snapshot: {}", e),
            }
        }
        Ok(Event::Incoming(Packet::SubAck(_))) => info!("Subscription acknowledged by broker"),
        Ok(_) => {}
        Err(e) => {
            error!("MQTT connection error: {}", e);
            fanout.broadcast(&FeedEvent::ConnectionLost(e.to_string()));
            return ControlFlow::Break(());
        }
    }

    ControlFlow::Continue(())
}
