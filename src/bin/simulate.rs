use std::env;
use std::thread;
use std::time::{Duration, Instant};

use argh::FromArgs;
use log::{error, info, warn};
use rumqttc::{Client, Event, Outgoing};

use slopewatch::config::ConfigManager;
use slopewatch::logger;
use slopewatch::mqtt::MqttSource;
use slopewatch::simulator::{encode_snapshot, generate_snapshot, profile, RiskProfile, PROFILES};

const SIMULATOR_CLIENT_ID: &str = "slopewatch_simulator";

/// Publish synthetic landslide sensor snapshots.
#[derive(FromArgs)]
struct SimulateArgs {
    /// risk profile: aman, awas or waspada
    #[argh(option, default = "String::from(\"aman\")")]
    risk: String,

    /// single, continuous, test or clear
    #[argh(option, default = "String::from(\"single\")")]
    mode: String,

    /// seconds between readings in continuous mode
    #[argh(option, default = "5.0")]
    interval: f64,

    /// stop continuous mode after this many seconds
    #[argh(option)]
    duration: Option<u64>,

    /// configuration file (defaults to SLOPEWATCH_CONFIG or config.toml)
    #[argh(option)]
    config: Option<String>,
}

/// 发布端：后台线程驱动连接，主线程发布
struct Publisher {
    client: Client,
    topic: String,
    qos: rumqttc::QoS,
    driver: thread::JoinHandle<()>,
}

impl Publisher {
    fn connect(source: &MqttSource) -> Self {
        let (client, mut connection) = Client::new(source.options_for(SIMULATOR_CLIENT_ID), 10);
        let driver = thread::spawn(move || {
            for event in connection.iter() {
                match event {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        error!("MQTT connection error: {}", e);
                        break;
                    }
                }
            }
        });

        Self {
            client,
            topic: source.config().topic.clone(),
            qos: source.config().qos_level(),
            driver,
        }
    }

    /// 保留消息，新订阅者立即拿到最近一次读数
    fn publish(&self, payload: Vec<u8>) -> Result<(), rumqttc::ClientError> {
        self.client.publish(self.topic.clone(), self.qos, true, payload)
    }

    fn close(self) {
        if let Err(e) = self.client.disconnect() {
            warn!("Disconnect request not delivered: {}", e);
        }
        if self.driver.join().is_err() {
            error!("MQTT driver thread panicked");
        }
    }
}

fn publish_one(publisher: &Publisher, profile: &RiskProfile, count: u64) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = generate_snapshot(profile, &mut rand::rng());
    publisher.publish(encode_snapshot(profile, &snapshot)?)?;

    let alert = if snapshot.status.alert_triggered { "ALERT" } else { "normal" };
    info!(
        "#{:04} risk={} {} tilt={:.1} vibration={:.2}",
        count,
        profile.label.to_uppercase(),
        alert,
        snapshot.sensors.tilt.max_tilt,
        snapshot.sensors.vibration_rms
    );
    Ok(())
}

fn run_continuous(
    publisher: &Publisher,
    profile: &RiskProfile,
    interval: Duration,
    duration: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Continuous simulation for {} every {:?}", profile.name, interval);
    let deadline = duration.map(|d| Instant::now() + d);

    let mut count = 0;
    while deadline.map_or(true, |end| Instant::now() < end) {
        count += 1;
        publish_one(publisher, profile, count)?;
        thread::sleep(interval);
    }

    info!("Simulation finished after {} readings", count);
    Ok(())
}

fn print_all_profiles() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = rand::rng();
    for profile in &PROFILES {
        let snapshot = generate_snapshot(profile, &mut rng);
        println!("--- {} ---", profile.name);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok(); // 加载 .env 文件
    logger::init_logger();
    let args: SimulateArgs = argh::from_env();

    if args.mode == "test" {
        return print_all_profiles();
    }

    let profile = profile(&args.risk).ok_or_else(|| format!("Unknown risk profile: {}", args.risk))?;

    let config_path = args
        .config
        .or_else(|| env::var("SLOPEWATCH_CONFIG").ok())
        .unwrap_or_else(|| "config.toml".to_string());
    let mut config = ConfigManager::load_or_default(&config_path)?.get_config().clone();
    config.apply_env_overrides()?;
    config.validate()?;

    let source = MqttSource::new(config.mqtt.clone());
    let publisher = Publisher::connect(&source);
    info!("Publishing to {} on {}:{}", config.mqtt.topic, config.mqtt.broker, config.mqtt.port);

    let result = match args.mode.as_str() {
        "single" => publish_one(&publisher, profile, 1),
        "continuous" => {
            if !(args.interval.is_finite() && args.interval > 0.0) {
                Err("Interval must be a positive number of seconds".into())
            } else {
                run_continuous(
                    &publisher,
                    profile,
                    Duration::from_secs_f64(args.interval),
                    args.duration.map(Duration::from_secs),
                )
            }
        }
        // 空的保留消息：仪表盘显示 "data not found"
        "clear" => publisher.publish(Vec::new()).map_err(Into::into),
        other => Err(format!("Unknown mode: {}", other).into()),
    };

    publisher.close();
    result
}
