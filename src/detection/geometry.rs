//! 从人脸关键点中取出双眼六点并转换为像素坐标

use crate::landmarks::{FaceLandmarks, NormalizedLandmark};

use super::ear::{average_ear, calculate_ear};
use super::types::{EyePoints, PixelPoint};

/// MediaPipe FaceMesh 左眼索引：外眼角、上眼睑×2、内眼角、下眼睑×2
pub const LEFT_EYE_INDICES: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// MediaPipe FaceMesh 右眼索引，顺序同左眼
pub const RIGHT_EYE_INDICES: [usize; 6] = [33, 160, 158, 133, 153, 144];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeGeometry {
    pub left: EyePoints,
    pub right: EyePoints,
}

impl EyeGeometry {
    /// 双眼 EAR 均值；任一眼几何退化时返回 `None`
    pub fn average_ear(&self) -> Option<f64> {
        let left = calculate_ear(&self.left)?;
        let right = calculate_ear(&self.right)?;
        Some(average_ear(left, right))
    }
}

/// 关键点数量不足以覆盖眼部索引时返回 `None`。
pub fn extract_eyes(landmarks: &FaceLandmarks, width: u32, height: u32) -> Option<EyeGeometry> {
    Some(EyeGeometry {
        left: eye_points(landmarks, &LEFT_EYE_INDICES, width, height)?,
        right: eye_points(landmarks, &RIGHT_EYE_INDICES, width, height)?,
    })
}

fn eye_points(
    landmarks: &FaceLandmarks,
    indices: &[usize; 6],
    width: u32,
    height: u32,
) -> Option<EyePoints> {
    let mut points = [PixelPoint::default(); 6];
    for (slot, &index) in points.iter_mut().zip(indices) {
        *slot = to_pixel(landmarks.get(index)?, width, height);
    }
    Some(points)
}

// 截断取整
fn to_pixel(landmark: &NormalizedLandmark, width: u32, height: u32) -> PixelPoint {
    PixelPoint::new(
        (f64::from(landmark.x) * f64::from(width)) as i32,
        (f64::from(landmark.y) * f64::from(height)) as i32,
    )
}
