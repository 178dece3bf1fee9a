//! EAR (Eye Aspect Ratio) 计算
//!
//! 公式: EAR = (|p1-p5| + |p2-p4|) / (2 * |p0-p3|)
//! 每帧独立计算，不做跨帧平滑。

use super::types::EyePoints;

/// 计算单眼 EAR。
///
/// 眼角距离为 0 时几何退化，返回 `None`。
pub fn calculate_ear(eye: &EyePoints) -> Option<f64> {
    let horizontal = eye[0].distance(&eye[3]);
    if horizontal == 0.0 {
        return None;
    }

    let vertical_1 = eye[1].distance(&eye[5]);
    let vertical_2 = eye[2].distance(&eye[4]);

    Some((vertical_1 + vertical_2) / (2.0 * horizontal))
}

pub fn average_ear(left: f64, right: f64) -> f64 {
    (left + right) / 2.0
}
