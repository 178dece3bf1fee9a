//! 单个客户端连接的会话：持有独立的检测器，按到达顺序逐帧处理。

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::detection::frame::{decode_frame, FrameError};
use crate::detection::{
    observe, DetectorConfig, DrowsinessDetector, FrameVerdict, Observation, StatusLabel,
};
use crate::landmarks::{LandmarkError, LandmarkProvider};
use crate::protocol::{ClientMessage, ServerMessage, INVALID_FRAME};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Landmark(#[from] LandmarkError),
    #[error("frame worker failed: {0}")]
    Worker(String),
}

impl SessionError {
    fn client_message(&self) -> String {
        match self {
            SessionError::Frame(_) => INVALID_FRAME.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub messages: u64,
    pub awake: u64,
    pub sleeping: u64,
    pub no_face: u64,
    pub empty_frames: u64,
    pub errors: u64,
}

impl SessionStats {
    fn record(&mut self, status: StatusLabel) {
        match status {
            StatusLabel::Awake => self.awake += 1,
            StatusLabel::Sleeping => self.sleeping += 1,
            StatusLabel::NoFaceDetected => self.no_face += 1,
            StatusLabel::NoFrameReceived => self.empty_frames += 1,
        }
    }
}

pub struct Session {
    id: Uuid,
    detector: DrowsinessDetector,
    provider: Arc<dyn LandmarkProvider>,
    stats: SessionStats,
}

impl Session {
    pub fn new(provider: Arc<dyn LandmarkProvider>, config: DetectorConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            detector: DrowsinessDetector::new(config),
            provider,
            stats: SessionStats::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// 每条入站消息恰好产生一条出站消息
    pub async fn handle_text(&mut self, text: &str, received_at: Instant) -> ServerMessage {
        self.stats.messages += 1;

        let reply = match ClientMessage::parse(text) {
            Ok(ClientMessage::Frame { data }) => self.handle_frame(data, received_at).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected client message");
                ServerMessage::error(e.to_string())
            }
        };

        if matches!(reply, ServerMessage::Error { .. }) {
            self.stats.errors += 1;
        }
        reply
    }

    async fn handle_frame(&mut self, data: Option<String>, received_at: Instant) -> ServerMessage {
        let provider = Arc::clone(&self.provider);
        let analyzed =
            tokio::task::spawn_blocking(move || analyze(provider.as_ref(), data.as_deref()))
                .await
                .map_err(|e| SessionError::Worker(e.to_string()))
                .and_then(|result| result);

        match analyzed {
            Ok(observation) => {
                let verdict = self.apply(&observation, received_at);
                ServerMessage::status(verdict.status)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Frame processing failed");
                ServerMessage::error(e.client_message())
            }
        }
    }

    /// 在会话任务上推进状态机
    pub fn apply(&mut self, observation: &Observation, received_at: Instant) -> FrameVerdict {
        let verdict = self.detector.process(observation, received_at);
        self.stats.record(verdict.status);
        tracing::debug!(
            status = %verdict.status,
            phase = ?verdict.phase,
            average_ear = ?verdict.average_ear,
            "Frame processed"
        );
        verdict
    }
}

/// 解码 + 关键点推理，CPU 密集，在阻塞线程池上运行
pub fn analyze(
    provider: &dyn LandmarkProvider,
    data: Option<&str>,
) -> Result<Observation, SessionError> {
    let frame = data.map(decode_frame).transpose()?;
    Ok(observe(provider, frame.as_ref())?)
}
