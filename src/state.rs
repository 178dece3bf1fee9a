use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::detection::DetectorConfig;
use crate::landmarks::LandmarkProvider;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    detector_config: DetectorConfig,
    landmarks: Arc<dyn LandmarkProvider>,
    active_sessions: Arc<AtomicUsize>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

/// 会话名额，drop 时归还
pub struct SessionSlot {
    counter: Arc<AtomicUsize>,
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AppState {
    pub fn new(
        config: &Config,
        landmarks: Arc<dyn LandmarkProvider>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            config: Arc::new(config.clone()),
            detector_config: config.detector.to_detector_config(),
            landmarks,
            active_sessions: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn detector_config(&self) -> DetectorConfig {
        self.detector_config
    }

    pub fn landmarks(&self) -> Arc<dyn LandmarkProvider> {
        Arc::clone(&self.landmarks)
    }

    pub fn try_acquire_session(&self) -> Option<SessionSlot> {
        let max = self.config.limits.max_sessions;
        let current = self.active_sessions.fetch_add(1, Ordering::SeqCst);
        if current >= max {
            self.active_sessions.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(SessionSlot {
            counter: Arc::clone(&self.active_sessions),
        })
    }

    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::SeqCst)
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
