//! 闭眼时长状态机
//!
//! 三个阶段：AwakeOpen（无计时）→ AwakeClosing（计时中，未达阈值）→ Sleeping（计时已达阈值）。
//! 睁眼或未检测到人脸时计时清零；进入 Sleeping 后只要持续闭眼就保持，不重新计时。

use std::time::{Duration, Instant};

use crate::constants::{DEFAULT_EAR_THRESHOLD, DEFAULT_SLEEP_DURATION_SECS};

use super::types::{DetectorPhase, StatusLabel};
use super::Observation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// EAR 低于该值视为闭眼
    pub ear_threshold: f64,
    /// 持续闭眼达到该时长判定为睡着
    pub sleep_duration: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            sleep_duration: Duration::from_secs_f64(DEFAULT_SLEEP_DURATION_SECS),
        }
    }
}

/// 单帧判定结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameVerdict {
    pub status: StatusLabel,
    pub phase: DetectorPhase,
    pub average_ear: Option<f64>,
}

/// 每个会话独占一个实例，不跨会话共享
#[derive(Debug)]
pub struct DrowsinessDetector {
    config: DetectorConfig,
    eyes_closed_since: Option<Instant>,
    phase: DetectorPhase,
}

impl DrowsinessDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            eyes_closed_since: None,
            phase: DetectorPhase::AwakeOpen,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn phase(&self) -> DetectorPhase {
        self.phase
    }

    pub fn eyes_closed_since(&self) -> Option<Instant> {
        self.eyes_closed_since
    }

    pub fn process(&mut self, observation: &Observation, now: Instant) -> FrameVerdict {
        let average_ear = match observation {
            // 空帧不触碰计时器
            Observation::Empty => {
                return FrameVerdict {
                    status: StatusLabel::NoFrameReceived,
                    phase: self.phase,
                    average_ear: None,
                }
            }
            Observation::NoFace => None,
            Observation::Face(geometry) => geometry.average_ear(),
        };

        let status = self.update(average_ear, now);
        FrameVerdict {
            status,
            phase: self.phase,
            average_ear,
        }
    }

    /// `None` 表示本帧没有可用的人脸（含几何退化）。
    pub fn update(&mut self, average_ear: Option<f64>, now: Instant) -> StatusLabel {
        let Some(ear) = average_ear else {
            self.reset();
            return StatusLabel::NoFaceDetected;
        };

        tracing::debug!(ear, threshold = self.config.ear_threshold, "EAR");

        if ear >= self.config.ear_threshold {
            if self.eyes_closed_since.is_some() {
                tracing::debug!("Eyes opened, closure timer cleared");
            }
            self.reset();
            return StatusLabel::Awake;
        }

        match self.eyes_closed_since {
            None => {
                tracing::debug!("Eyes closed, closure timer started");
                self.eyes_closed_since = Some(now);
                self.transition(DetectorPhase::AwakeClosing);
                StatusLabel::Awake
            }
            Some(since) => {
                let elapsed = now.saturating_duration_since(since);
                if elapsed >= self.config.sleep_duration {
                    self.transition(DetectorPhase::Sleeping);
                    StatusLabel::Sleeping
                } else {
                    tracing::trace!(elapsed_ms = elapsed.as_millis() as u64, "Eyes still closed");
                    self.transition(DetectorPhase::AwakeClosing);
                    StatusLabel::Awake
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.eyes_closed_since = None;
        self.transition(DetectorPhase::AwakeOpen);
    }

    fn transition(&mut self, next: DetectorPhase) {
        if self.phase != next {
            if next == DetectorPhase::Sleeping {
                tracing::info!(from = ?self.phase, "Sleep detected");
            } else {
                tracing::debug!(from = ?self.phase, to = ?next, "Detector phase changed");
            }
            self.phase = next;
        }
    }
}

impl Default for DrowsinessDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
