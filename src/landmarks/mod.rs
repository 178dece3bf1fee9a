//! Face landmark providers.
//!
//! A provider takes a decoded RGB frame and returns the landmarks of the most
//! prominent face, if any. Coordinates are normalized to `0..1` of the frame.

pub mod face_mesh;

use std::sync::Arc;

use image::RgbImage;
use thiserror::Error;

use crate::config::LandmarkConfig;

pub use face_mesh::FaceMeshProvider;

#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("landmark model unavailable: {0}")]
    ModelLoad(String),
    #[error("landmark inference failed: {0}")]
    Inference(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
}

impl NormalizedLandmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Landmarks of a single face, addressed by the model's stable index scheme.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<NormalizedLandmark>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<NormalizedLandmark>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<&NormalizedLandmark> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub trait LandmarkProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Only the first detected face is returned.
    fn detect(&self, frame: &RgbImage) -> Result<Option<FaceLandmarks>, LandmarkError>;
}

/// Used when no model is configured: every frame reports no face.
#[derive(Debug, Default)]
pub struct NoFaceProvider;

impl LandmarkProvider for NoFaceProvider {
    fn name(&self) -> &'static str {
        "none"
    }

    fn detect(&self, _frame: &RgbImage) -> Result<Option<FaceLandmarks>, LandmarkError> {
        Ok(None)
    }
}

pub fn provider_from_config(
    config: &LandmarkConfig,
) -> Result<Arc<dyn LandmarkProvider>, LandmarkError> {
    match &config.model_path {
        Some(path) => {
            let provider = FaceMeshProvider::load(path, config.min_score, config.threads)?;
            tracing::info!(model = %path.display(), "Face mesh model loaded");
            Ok(Arc::new(provider))
        }
        None => {
            tracing::warn!(
                "FACE_MESH_MODEL not set, every frame will report no-face-detected"
            );
            Ok(Arc::new(NoFaceProvider))
        }
    }
}
