use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("undecodable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decodes a base64 image (optionally a `data:image/...;base64,` URL) into RGB pixels.
pub fn decode_frame(payload: &str) -> Result<RgbImage, FrameError> {
    let bytes = BASE64.decode(strip_data_url(payload.trim()))?;
    let image = image::load_from_memory(&bytes)?;
    Ok(image.to_rgb8())
}

fn strip_data_url(payload: &str) -> &str {
    match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    }
}
