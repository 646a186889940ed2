use chrono::Local;
use rand::Rng;

use crate::types::{LandslideRisk, RiskStatus, SensorReadings, SensorSnapshot, Tilt, Triaxial};

const GRAVITY: f64 = 9.81;
pub const SIMULATOR_DEVICE_ID: &str = "SIMULATOR_001";

/// 一个风险档位的取值范围
#[derive(Debug, Clone, PartialEq)]
pub struct RiskProfile {
    /// 发布时写入 landslideRisk 的标签
    pub label: &'static str,
    pub name: &'static str,
    pub vibration_rms: (f64, f64),
    pub tilt_angle: (f64, f64),
    pub soil_moisture: (f64, f64),
    pub rainfall: (f64, f64),
    pub temperature: (f64, f64),
    /// (z 轴噪声, x/y 幅度)
    pub acceleration: (f64, f64),
    pub gyro: (f64, f64),
    pub alert_probability: f64,
}

pub const PROFILES: [RiskProfile; 3] = [
    RiskProfile {
        label: "aman",
        name: "Aman (Safe)",
        vibration_rms: (0.15, 0.25),
        tilt_angle: (0.0, 0.8),
        soil_moisture: (25.0, 35.0),
        rainfall: (0.0, 2.0),
        temperature: (22.0, 26.0),
        acceleration: (0.8, 1.2),
        gyro: (0.1, 0.2),
        alert_probability: 0.0,
    },
    RiskProfile {
        label: "awas",
        name: "Awas (Watch)",
        vibration_rms: (0.5, 1.2),
        tilt_angle: (2.0, 8.0),
        soil_moisture: (40.0, 70.0),
        rainfall: (5.0, 15.0),
        temperature: (18.0, 32.0),
        acceleration: (2.0, 5.0),
        gyro: (0.5, 1.5),
        alert_probability: 0.1,
    },
    RiskProfile {
        label: "waspada",
        name: "Waspada (Alert)",
        vibration_rms: (1.2, 3.0),
        tilt_angle: (8.0, 20.0),
        soil_moisture: (70.0, 95.0),
        rainfall: (15.0, 50.0),
        temperature: (15.0, 35.0),
        acceleration: (5.0, 15.0),
        gyro: (1.5, 5.0),
        alert_probability: 0.8,
    },
];

pub fn profile(label: &str) -> Option<&'static RiskProfile> {
    PROFILES.iter().find(|p| p.label.eq_ignore_ascii_case(label.trim()))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn symmetric<R: Rng>(rng: &mut R, magnitude: f64) -> f64 {
    rng.random_range(-magnitude..=magnitude)
}

fn within<R: Rng>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    rng.random_range(low..=high)
}

/// 按档位生成一条与设备格式一致的快照
pub fn generate_snapshot<R: Rng>(profile: &RiskProfile, rng: &mut R) -> SensorSnapshot {
    let (z_noise, xy_amplitude) = profile.acceleration;
    let accelerometer = Triaxial::new(
        round_to(symmetric(rng, xy_amplitude), 2),
        round_to(symmetric(rng, xy_amplitude), 2),
        round_to(GRAVITY + symmetric(rng, z_noise), 2),
    );

    let gyro_amplitude = profile.gyro.1;
    let gyro = Triaxial::new(
        round_to(symmetric(rng, gyro_amplitude), 2),
        round_to(symmetric(rng, gyro_amplitude), 2),
        round_to(symmetric(rng, gyro_amplitude), 2),
    );

    let tilt_amplitude = profile.tilt_angle.1;
    let angle_x = round_to(symmetric(rng, tilt_amplitude), 1);
    let angle_y = round_to(symmetric(rng, tilt_amplitude), 1);

    SensorSnapshot {
        sensors: SensorReadings {
            accelerometer,
            gyro,
            tilt: Tilt {
                angle_x,
                angle_y,
                max_tilt: round_to(angle_x.abs().max(angle_y.abs()), 1),
            },
            soil_moisture: round_to(within(rng, profile.soil_moisture), 1),
            rainfall: round_to(within(rng, profile.rainfall), 1),
            temperature: round_to(within(rng, profile.temperature), 1),
            vibration_rms: round_to(within(rng, profile.vibration_rms), 2),
        },
        status: RiskStatus {
            landslide_risk: LandslideRisk::from_label(profile.label),
            alert_triggered: rng.random_bool(profile.alert_probability),
        },
        timestamp: Some(Local::now().to_rfc3339()),
        device_id: Some(SIMULATOR_DEVICE_ID.to_string()),
    }
}

/// 发布用的 JSON；风险标签保持档位原名
pub fn encode_snapshot(profile: &RiskProfile, snapshot: &SensorSnapshot) -> Result<Vec<u8>, serde_json::Error> {
    let mut value = serde_json::to_value(snapshot)?;
    if let Some(status) = value.get_mut("status").and_then(|s| s.as_object_mut()) {
        status.insert("landslideRisk".to_string(), profile.label.into());
    }
    serde_json::to_vec(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mqtt::decode_snapshot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    #[test_case("aman", LandslideRisk::Safe)]
    #[test_case("AWAS", LandslideRisk::Danger)]
    #[test_case(" waspada ", LandslideRisk::Warning)]
    fn test_profiles_map_to_risk(label: &str, expected: LandslideRisk) {
        let profile = profile(label).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let snapshot = generate_snapshot(profile, &mut rng);
        assert_eq!(snapshot.status.landslide_risk, expected);
    }

    #[test]
    fn test_unknown_profile() {
        assert!(profile("bahaya").is_none());
    }

    #[test]
    fn test_values_stay_in_profile_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for profile in &PROFILES {
            for _ in 0..50 {
                let s = generate_snapshot(profile, &mut rng).sensors;
                assert!(s.soil_moisture >= profile.soil_moisture.0 - 0.05);
                assert!(s.soil_moisture <= profile.soil_moisture.1 + 0.05);
                assert!(s.rainfall >= profile.rainfall.0 - 0.05 && s.rainfall <= profile.rainfall.1 + 0.05);
                assert!(s.accelerometer.x.abs() <= profile.acceleration.1 + 0.005);
                assert!((s.accelerometer.z - GRAVITY).abs() <= profile.acceleration.0 + 0.005);
                assert!(s.gyro.z.abs() <= profile.gyro.1 + 0.005);
                assert_eq!(s.tilt.max_tilt, round_to(s.tilt.angle_x.abs().max(s.tilt.angle_y.abs()), 1));
            }
        }
    }

    #[test]
    fn test_safe_profile_never_alerts() {
        let mut rng = StdRng::seed_from_u64(1);
        let safe = profile("aman").unwrap();
        assert!((0..100).all(|_| !generate_snapshot(safe, &mut rng).status.alert_triggered));
    }

    #[test]
    fn test_encoded_payload_decodes_with_original_label() {
        let mut rng = StdRng::seed_from_u64(3);
        let awas = profile("awas").unwrap();
        let snapshot = generate_snapshot(awas, &mut rng);
        let payload = encode_snapshot(awas, &snapshot).unwrap();

        let text = String::from_utf8(payload.clone()).unwrap();
        assert!(text.contains(r#""landslideRisk":"awas""#));
        assert!(text.contains(r#""deviceId":"SIMULATOR_001""#));

        let decoded = decode_snapshot(&payload).unwrap().unwrap();
        assert_eq!(decoded, snapshot);
    }
}
