use std::fmt;

use serde::{Deserialize, Serialize};

/// 像素坐标系中的整数点
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PixelPoint) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// 单眼六点：p0/p3 为眼角，(p1,p5)、(p2,p4) 为上下眼睑配对
pub type EyePoints = [PixelPoint; 6];

/// 每帧对外输出的状态标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusLabel {
    #[serde(rename = "awake")]
    Awake,
    #[serde(rename = "sleeping")]
    Sleeping,
    #[serde(rename = "no-face-detected")]
    NoFaceDetected,
    #[serde(rename = "No frame received")]
    NoFrameReceived,
}

impl StatusLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::Awake => "awake",
            StatusLabel::Sleeping => "sleeping",
            StatusLabel::NoFaceDetected => "no-face-detected",
            StatusLabel::NoFrameReceived => "No frame received",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 检测器内部阶段
///
/// - `AwakeOpen`: 没有闭眼计时
/// - `AwakeClosing`: 正在闭眼，时长未达阈值
/// - `Sleeping`: 闭眼时长已达阈值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DetectorPhase {
    #[default]
    AwakeOpen,
    AwakeClosing,
    Sleeping,
}
