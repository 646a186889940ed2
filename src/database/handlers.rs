use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, Receiver};
use log::{error, info, warn};

use super::manager::{DatabaseManager, HistoryError};
use crate::config::DatabaseConfig;
use crate::types::{DatabaseTask, FeedEvent, ReceivedSnapshot};

/// 把推送攒成批次写入历史表
pub struct HistoryRecorder {
    store: DatabaseManager,
    pending: Vec<ReceivedSnapshot>,
    batch_size: usize,
    flush_interval: Duration,
    last_flush: Instant,
}

impl HistoryRecorder {
    pub fn new(store: DatabaseManager, batch_size: usize, flush_interval: Duration, now: Instant) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            store,
            pending: Vec::with_capacity(batch_size),
            batch_size,
            flush_interval,
            last_flush: now,
        }
    }

    pub fn store(&self) -> &DatabaseManager {
        &self.store
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// 记录一条快照，攒满一批立即写入
    pub fn record(&mut self, snapshot: ReceivedSnapshot, now: Instant) -> Result<usize, HistoryError> {
        self.pending.push(snapshot);
        if self.pending.len() >= self.batch_size {
            return self.flush(now);
        }
        Ok(0)
    }

    /// 距上次写入超过间隔且有待写数据时写入
    pub fn flush_if_due(&mut self, now: Instant) -> Result<usize, HistoryError> {
        if self.pending.is_empty() || now.duration_since(self.last_flush) < self.flush_interval {
            return Ok(0);
        }
        self.flush(now)
    }

    /// 写入失败时这一批会被丢弃，避免无限堆积
    pub fn flush(&mut self, now: Instant) -> Result<usize, HistoryError> {
        self.last_flush = now;
        if self.pending.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::take(&mut self.pending);
        let written = self.store.insert_snapshots(&batch)?;
        info!("History flushed {} rows", written);
        Ok(written)
    }
}

pub fn run_history_handler(
    task_receiver: Receiver<DatabaseTask>,
    feed_receiver: Receiver<FeedEvent>,
    config: DatabaseConfig,
    shutdown_signal: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    // 在数据库线程中创建连接
    let store = match DatabaseManager::open(&config) {
        Ok(db) => {
            info!("History handler thread: DuckDB initialized successfully");
            db
        }
        Err(e) => {
            error!("History handler thread: Failed to initialize DuckDB: {}", e);
            return Err(e.into());
        }
    };

    let mut recorder = HistoryRecorder::new(store, config.batch_size, config.flush_interval(), Instant::now());
    let mut feed_receiver = feed_receiver;

    info!("History handler thread started");

    while !shutdown_signal.load(Ordering::Relaxed) {
        let mut feed_closed = false;
        select! {
            recv(feed_receiver) -> msg => match msg {
                Ok(FeedEvent::Snapshot(snapshot)) => {
                    if let Err(e) = recorder.record(snapshot, Instant::now()) {
                        error!("History handler: Failed to write batch: {}", e);
                    }
                }
                Ok(FeedEvent::DataNotFound) => info!("History handler: Feed reported no data"),
                Ok(FeedEvent::ConnectionLost(reason)) => info!("History handler: Feed lost: {}", reason),
                Err(_) => {
                    // 所有发送端都已关闭，只继续处理查询
                    info!("History handler: Feed channel disconnected");
                    feed_closed = true;
                }
            },
            recv(task_receiver) -> msg => match msg {
                Ok(task) => handle_task(&mut recorder, task),
                Err(_) => {
                    info!("History handler: Task channel disconnected, exiting");
                    break;
                }
            },
            default(Duration::from_millis(100)) => {}
        }

        if feed_closed {
            feed_receiver = never();
        }

        if let Err(e) = recorder.flush_if_due(Instant::now()) {
            error!("History handler: Periodic flush failed: {}", e);
        }
    }

    if let Err(e) = recorder.flush(Instant::now()) {
        error!("History handler: Final flush failed: {}", e);
    }

    info!("History handler thread exiting gracefully");
    Ok(())
}

fn handle_task(recorder: &mut HistoryRecorder, task: DatabaseTask) {
    // 先写入待写数据，保证查询能看到最新的行
    if let Err(e) = recorder.flush(Instant::now()) {
        error!("History handler: Flush before query failed: {}", e);
    }

    match task {
        DatabaseTask::LoadPage {
            cursor,
            page_size,
            response_sender,
        } => {
            let result = recorder.store().load_page(cursor, page_size).map_err(|e| {
                error!("History handler: Failed to load page: {}", e);
                format!("Failed to load history: {}", e)
            });
            if let Ok(page) = &result {
                info!("History handler: Served page with {} rows", page.records.len());
            }
            if let Err(e) = response_sender.try_send(result) {
                warn!("History handler: Failed to send page: {}", e);
            }
        }
        DatabaseTask::CountRecords { response_sender } => {
            let count = recorder.store().count().unwrap_or_else(|e| {
                error!("History handler: Failed to count rows: {}", e);
                0
            });
            if let Err(e) = response_sender.try_send(count) {
                warn!("History handler: Failed to send count: {}", e);
            }
        }
    }
}
