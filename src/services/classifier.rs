use anyhow::Context;
use image::{imageops::FilterType, RgbImage};
use ndarray::Array4;
use parking_lot::Mutex;

use crate::models::catalog::CLASS_COUNT;
use crate::models::error::AppError;

/// Square input resolution the model was trained on.
pub const MODEL_INPUT_SIZE: u32 = 224;

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize and normalize an RGB image into the NHWC tensor the model expects.
/// Direct resize, aspect ratio not preserved; pixel intensities scaled to
/// [0, 1]; wrapped as a batch of one.
pub fn preprocess(img: &RgbImage) -> Array4<f32> {
    let resized = image::imageops::resize(
        img,
        MODEL_INPUT_SIZE,
        MODEL_INPUT_SIZE,
        FilterType::Triangle,
    );

    let size = MODEL_INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));

    for y in 0..size {
        for x in 0..size {
            let pixel = resized.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                tensor[[0, y, x, c]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Model adapter
// ---------------------------------------------------------------------------

/// Seam between the pipeline and the inference runtime, so tests can
/// substitute a fake without a model artifact on disk.
pub trait Classifier: Send + Sync {
    /// Run the model on a batch-of-1 tensor and return the probability
    /// vector over all classes.
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, AppError>;
}

/// Process-lifetime owner of the loaded ONNX session. Loaded once, eagerly,
/// before the server accepts traffic; a load failure aborts startup.
pub struct OnnxClassifier {
    // ort sessions take &mut self to run; the lock covers only the inference
    // call, never preprocessing or decision logic.
    session: Mutex<ort::session::Session>,
}

impl OnnxClassifier {
    pub fn load(model_path: &str) -> anyhow::Result<Self> {
        let session = ort::session::Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load ONNX model from '{}'", model_path))?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, AppError> {
        let input_value = ort::value::Tensor::from_array(input)
            .map_err(|e| AppError::Inference(format!("failed to create input tensor: {}", e)))?;

        let probs: Vec<f32> = {
            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![input_value])
                .map_err(|e| AppError::Inference(format!("inference failed: {}", e)))?;
            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| AppError::Inference(format!("failed to extract output: {}", e)))?;
            data.to_vec()
        };

        if probs.len() != CLASS_COUNT {
            return Err(AppError::Inference(format!(
                "model returned {} scores, expected {}",
                probs.len(),
                CLASS_COUNT
            )));
        }

        Ok(probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn preprocess_produces_batch_of_one_nhwc() {
        let img = RgbImage::from_pixel(640, 480, Rgb([0, 0, 0]));
        let tensor = preprocess(&img);
        assert_eq!(
            tensor.shape(),
            &[1, MODEL_INPUT_SIZE as usize, MODEL_INPUT_SIZE as usize, 3]
        );
    }

    #[test]
    fn preprocess_scales_intensities_to_unit_range() {
        let white = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        let tensor = preprocess(&white);
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < f32::EPSILON));

        let black = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let tensor = preprocess(&black);
        assert!(tensor.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn preprocess_resizes_arbitrary_dimensions() {
        // Non-square input still maps onto the fixed square resolution.
        let img = RgbImage::from_pixel(37, 911, Rgb([128, 64, 32]));
        let tensor = preprocess(&img);
        assert_eq!(tensor.len(), (MODEL_INPUT_SIZE * MODEL_INPUT_SIZE * 3) as usize);
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
