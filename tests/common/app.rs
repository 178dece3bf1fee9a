use std::sync::Arc;

use axum::Router;
use tokio::sync::broadcast;

use drowsiness_backend::config::{Config, DetectorSettings, LimitsConfig};
use drowsiness_backend::landmarks::LandmarkProvider;
use drowsiness_backend::routes::build_router;
use drowsiness_backend::state::AppState;

use super::frames::EarCodedProvider;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
}

pub struct TestOptions {
    pub sleep_duration_secs: f64,
    pub max_sessions: usize,
    pub max_frame_bytes: usize,
    pub provider: Arc<dyn LandmarkProvider>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            sleep_duration_secs: 1.0,
            max_sessions: 8,
            max_frame_bytes: LimitsConfig::default().max_frame_bytes,
            provider: Arc::new(EarCodedProvider),
        }
    }
}

pub fn spawn_with(options: TestOptions) -> TestApp {
    // 直接构造 Config，避免 set_var 在并行测试中互相干扰
    let config = Config {
        detector: DetectorSettings {
            ear_threshold: 0.2,
            sleep_duration_secs: options.sleep_duration_secs,
        },
        limits: LimitsConfig {
            max_sessions: options.max_sessions,
            max_frame_bytes: options.max_frame_bytes,
        },
        ..Config::default()
    };

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(&config, options.provider, shutdown_tx);
    let app = build_router(state.clone());

    TestApp { app, state, config }
}

pub fn spawn_test_app() -> TestApp {
    spawn_with(TestOptions::default())
}
