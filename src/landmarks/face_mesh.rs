//! MediaPipe FaceMesh running on ONNX Runtime.
//!
//! Expects an ONNX export of the 192x192 FaceMesh model with an NHWC float
//! input in `0..1` and two outputs: 468 x 3 landmark coordinates in input
//! pixel space, and a single face-presence logit.

use std::fmt::Display;
use std::path::Path;
use std::sync::Mutex;

use image::imageops::{self, FilterType};
use image::RgbImage;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

use super::{FaceLandmarks, LandmarkError, LandmarkProvider, NormalizedLandmark};

const INPUT_SIZE: u32 = 192;
const LANDMARK_COUNT: usize = 468;
const COORDS_PER_LANDMARK: usize = 3;

pub struct FaceMeshProvider {
    session: Mutex<Session>,
    min_score: f32,
}

fn load_err(e: impl Display) -> LandmarkError {
    LandmarkError::ModelLoad(e.to_string())
}

fn inference_err(e: impl Display) -> LandmarkError {
    LandmarkError::Inference(e.to_string())
}

impl FaceMeshProvider {
    pub fn load(path: &Path, min_score: f32, threads: usize) -> Result<Self, LandmarkError> {
        // 先检查文件，避免在模型缺失时加载 ONNX Runtime 动态库
        if !path.is_file() {
            return Err(LandmarkError::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(load_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_err)?
            .with_intra_threads(threads.max(1))
            .map_err(load_err)?
            .commit_from_file(path)
            .map_err(load_err)?;

        Ok(Self {
            session: Mutex::new(session),
            min_score,
        })
    }

    fn run(&self, input: Vec<f32>) -> Result<(Vec<f32>, Option<f32>), LandmarkError> {
        let side = INPUT_SIZE as usize;
        let tensor =
            Tensor::from_array(([1usize, side, side, 3], input.into_boxed_slice()))
                .map_err(inference_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| LandmarkError::Inference(format!("session lock poisoned: {e}")))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(inference_err)?;

        let mut coords = None;
        let mut score_logit = None;
        for (_name, value) in outputs.iter() {
            let (_shape, data) = value.try_extract_tensor::<f32>().map_err(inference_err)?;
            if data.len() >= LANDMARK_COUNT * COORDS_PER_LANDMARK {
                coords = Some(data.to_vec());
            } else if data.len() == 1 {
                score_logit = Some(data[0]);
            }
        }

        let coords = coords
            .ok_or_else(|| LandmarkError::Inference("model produced no landmark tensor".into()))?;
        Ok((coords, score_logit))
    }
}

impl LandmarkProvider for FaceMeshProvider {
    fn name(&self) -> &'static str {
        "face-mesh-onnx"
    }

    fn detect(&self, frame: &RgbImage) -> Result<Option<FaceLandmarks>, LandmarkError> {
        let (coords, score_logit) = self.run(to_input_tensor(frame))?;

        if let Some(logit) = score_logit {
            let score = sigmoid(logit);
            if score < self.min_score {
                tracing::trace!(score, "face score below threshold");
                return Ok(None);
            }
        }

        Ok(Some(parse_landmarks(&coords)))
    }
}

/// NHWC, RGB, `0..1`
fn to_input_tensor(frame: &RgbImage) -> Vec<f32> {
    let resized = imageops::resize(frame, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    resized
        .into_raw()
        .into_iter()
        .map(|channel| f32::from(channel) / 255.0)
        .collect()
}

fn parse_landmarks(coords: &[f32]) -> FaceLandmarks {
    let scale = INPUT_SIZE as f32;
    let points = coords
        .chunks_exact(COORDS_PER_LANDMARK)
        .take(LANDMARK_COUNT)
        .map(|xyz| NormalizedLandmark::new(xyz[0] / scale, xyz[1] / scale))
        .collect();
    FaceLandmarks::new(points)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
