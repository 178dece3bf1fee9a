//! 疲劳（睡眠）检测核心
//!
//! - `geometry`: 从关键点提取双眼六点
//! - `ear`: EAR 计算
//! - `detector`: 闭眼时长状态机
//! - `frame`: base64 图像帧解码

pub mod detector;
pub mod ear;
pub mod frame;
pub mod geometry;
pub mod types;

use image::RgbImage;

use crate::landmarks::{LandmarkError, LandmarkProvider};

pub use detector::{DetectorConfig, DrowsinessDetector, FrameVerdict};
pub use geometry::{extract_eyes, EyeGeometry};
pub use types::{DetectorPhase, EyePoints, PixelPoint, StatusLabel};

/// 关键点流水线对单帧的观测结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// 没有收到图像
    Empty,
    /// 没有人脸，或关键点不足以构成眼部几何
    NoFace,
    Face(EyeGeometry),
}

pub fn observe(
    provider: &dyn LandmarkProvider,
    frame: Option<&RgbImage>,
) -> Result<Observation, LandmarkError> {
    let Some(frame) = frame else {
        return Ok(Observation::Empty);
    };

    let Some(face) = provider.detect(frame)? else {
        return Ok(Observation::NoFace);
    };

    Ok(match extract_eyes(&face, frame.width(), frame.height()) {
        Some(geometry) => Observation::Face(geometry),
        None => {
            tracing::debug!(landmarks = face.len(), "Landmark set too small for eye geometry");
            Observation::NoFace
        }
    })
}
