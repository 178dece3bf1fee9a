use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CORS_ORIGINS, DEFAULT_EAR_THRESHOLD, DEFAULT_FACE_MIN_SCORE,
    DEFAULT_INFERENCE_THREADS, DEFAULT_MAX_FRAME_BYTES, DEFAULT_MAX_SESSIONS,
    DEFAULT_SLEEP_DURATION_SECS,
};
use crate::detection::DetectorConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origins: Vec<String>,
    pub detector: DetectorSettings,
    pub landmarks: LandmarkConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub ear_threshold: f64,
    pub sleep_duration_secs: f64,
}

#[derive(Debug, Clone)]
pub struct LandmarkConfig {
    /// 未设置时不做推理，所有帧返回 no-face-detected
    pub model_path: Option<PathBuf>,
    pub min_score: f32,
    pub threads: usize,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_sessions: usize,
    pub max_frame_bytes: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            sleep_duration_secs: DEFAULT_SLEEP_DURATION_SECS,
        }
    }
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            min_score: DEFAULT_FACE_MIN_SCORE,
            threads: DEFAULT_INFERENCE_THREADS,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl DetectorSettings {
    /// 非法阈值（NaN、无穷、非正数）与非法时长（负数、NaN、溢出）回退到默认值
    pub fn to_detector_config(&self) -> DetectorConfig {
        let ear_threshold = if self.ear_threshold.is_finite() && self.ear_threshold > 0.0 {
            self.ear_threshold
        } else {
            tracing::warn!(
                value = self.ear_threshold,
                "Invalid EAR threshold, using default"
            );
            DEFAULT_EAR_THRESHOLD
        };

        let sleep_duration = Duration::try_from_secs_f64(self.sleep_duration_secs)
            .unwrap_or_else(|_| {
                tracing::warn!(
                    value = self.sleep_duration_secs,
                    "Invalid sleep duration, using default"
                );
                Duration::from_secs_f64(DEFAULT_SLEEP_DURATION_SECS)
            });
        DetectorConfig {
            ear_threshold,
            sleep_duration,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: env_or_parse("PORT", 8000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origins: parse_list(&env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
            detector: DetectorSettings {
                ear_threshold: env_or_parse("EAR_THRESHOLD", DEFAULT_EAR_THRESHOLD),
                sleep_duration_secs: env_or_parse(
                    "SLEEP_DURATION_SECS",
                    DEFAULT_SLEEP_DURATION_SECS,
                ),
            },
            landmarks: LandmarkConfig {
                model_path: env::var("FACE_MESH_MODEL")
                    .ok()
                    .map(|raw| raw.trim().to_string())
                    .filter(|raw| !raw.is_empty())
                    .map(PathBuf::from),
                min_score: env_or_parse("FACE_MESH_MIN_SCORE", DEFAULT_FACE_MIN_SCORE),
                threads: env_or_parse("FACE_MESH_THREADS", DEFAULT_INFERENCE_THREADS),
            },
            limits: LimitsConfig {
                max_sessions: env_or_parse("MAX_SESSIONS", DEFAULT_MAX_SESSIONS),
                max_frame_bytes: env_or_parse("MAX_FRAME_BYTES", DEFAULT_MAX_FRAME_BYTES),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
            cors_origins: parse_list(DEFAULT_CORS_ORIGINS),
            detector: DetectorSettings::default(),
            landmarks: LandmarkConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
