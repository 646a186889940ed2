use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use dotenv::dotenv;
use eframe::egui;
use log::{error, info, warn};

use slopewatch::app::handlers::LiveFeedHandler;
use slopewatch::app::SensorDashboardApp;
use slopewatch::config::ConfigManager;
use slopewatch::database::run_history_handler;
use slopewatch::logger;
use slopewatch::mqtt::MqttSource;

const CONFIG_ENV: &str = "SLOPEWATCH_CONFIG";

fn main() {
    dotenv().ok(); // 加载 .env 文件
    logger::init_logger();
    info!("Application starting");

    let config_path = env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let mut config_manager = match ConfigManager::load_or_default(&config_path) {
        Ok(manager) => manager,
        Err(e) => {
            error!("Failed to load configuration from {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    // 首次运行时写出默认配置，方便修改
    if !Path::new(&config_path).exists() {
        match config_manager.save() {
            Ok(()) => info!("Default configuration written to {}", config_path),
            Err(e) => warn!("Could not write default configuration: {}", e),
        }
    }

    let config = config_manager.get_config_mut();
    if let Err(e) = config.apply_env_overrides().and_then(|_| config.validate()) {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    let config = config.clone();

    let (db_task_sender, db_task_receiver) = bounded(config.database.task_channel_capacity);
    let (history_sender, history_receiver) = bounded(config.mqtt.channel_capacity);
    let shutdown_signal = Arc::new(AtomicBool::new(false));

    // 数据库线程：记录历史并响应分页查询
    let db_config = config.database.clone();
    let db_shutdown = Arc::clone(&shutdown_signal);
    let db_handle = thread::Builder::new()
        .name("history-db".to_string())
        .spawn(move || {
            if let Err(e) = run_history_handler(db_task_receiver, history_receiver, db_config, db_shutdown) {
                error!("History thread failed: {}", e);
            }
        });
    let db_handle = match db_handle {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to spawn history thread: {}", e);
            std::process::exit(1);
        }
    };

    let source = MqttSource::new(config.mqtt.clone());

    let options = eframe::NativeOptions {
        vsync: config.window.vsync,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred, // 硬件加速优先模式
        renderer: eframe::Renderer::Glow,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_resizable(config.window.resizable),
        ..Default::default()
    };

    let title = config.window.title.clone();
    if let Err(e) = eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            let mut app = SensorDashboardApp::new(config_manager, source, db_task_sender, history_sender);
            LiveFeedHandler::mount(&mut app);
            Ok(Box::new(app))
        }),
    ) {
        error!("GUI failed: {}", e);
    }

    // GUI 关闭后订阅已随应用释放，通知数据库线程写完剩余数据
    info!("GUI closed, signaling history thread to shutdown");
    shutdown_signal.store(true, Ordering::Relaxed);

    match db_handle.join() {
        Ok(()) => info!("History thread shut down gracefully"),
        Err(e) => error!("History thread panicked: {:?}", e),
    }
}
