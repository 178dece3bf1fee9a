/// 默认 EAR 闭眼阈值（6 点方案）
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.2;

/// 默认判定睡着所需的持续闭眼时长（秒）
pub const DEFAULT_SLEEP_DURATION_SECS: f64 = 1.0;

/// FaceMesh 人脸置信度下限
pub const DEFAULT_FACE_MIN_SCORE: f32 = 0.5;

/// ONNX Runtime 推理线程数
pub const DEFAULT_INFERENCE_THREADS: usize = 2;

/// 同时在线会话上限
pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// 单条 WebSocket 消息最大字节数（base64 编码后的图像帧）
pub const DEFAULT_MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

/// 默认允许的跨域来源
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
