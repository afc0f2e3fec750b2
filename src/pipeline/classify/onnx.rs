//! ONNX product-photo classifier.
//!
//! Runs the pretrained CNN exported from the training job. Input
//! preprocessing must match training exactly: RGB, 128×128, f32 scaled to
//! [0, 1], NHWC batch of one. Output is a softmax row over the class ids
//! in `label_map.json`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;

use super::label_map::load_label_map;
use super::types::{ImageClassifier, Prediction, UNKNOWN_LABEL};
use super::ClassifyError;

/// Training-time input edge length.
const INPUT_SIZE: u32 = 128;

pub struct OnnxClassifier {
    session: Mutex<ort::session::Session>,
    labels: HashMap<usize, String>,
}

impl OnnxClassifier {
    /// Load the classifier from a directory containing `classifier.onnx`
    /// and `label_map.json`.
    pub fn load(model_dir: &Path) -> Result<Self, ClassifyError> {
        let model_path = model_dir.join("classifier.onnx");
        if !model_path.exists() {
            return Err(ClassifyError::ModelNotFound(model_path));
        }

        let labels = load_label_map(&model_dir.join("label_map.json"))?;

        let session = ort::session::Session::builder()
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(&model_path))
            .map_err(|e| ClassifyError::ModelInit(e.to_string()))?;

        tracing::info!(
            dir = %model_dir.display(),
            classes = labels.len(),
            "Product classifier loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
        })
    }

    fn preprocess(image_bytes: &[u8]) -> Result<ndarray::Array4<f32>, ClassifyError> {
        let decoded = image::load_from_memory(image_bytes)
            .map_err(|e| ClassifyError::ImageDecode(e.to_string()))?;

        let rgb = image::imageops::resize(
            &decoded.to_rgb8(),
            INPUT_SIZE,
            INPUT_SIZE,
            FilterType::CatmullRom,
        );

        let mut tensor =
            ndarray::Array4::<f32>::zeros((1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3));
        for (x, y, pixel) in rgb.enumerate_pixels() {
            for channel in 0..3 {
                tensor[[0, y as usize, x as usize, channel]] = pixel[channel] as f32 / 255.0;
            }
        }

        Ok(tensor)
    }
}

impl ImageClassifier for OnnxClassifier {
    fn predict(&self, image_bytes: &[u8]) -> Result<Prediction, ClassifyError> {
        let _span = tracing::info_span!("classify_product", image_size = image_bytes.len()).entered();

        let tensor = Self::preprocess(image_bytes)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::Inference("session lock poisoned".to_string()))?;

        let input = ort::value::TensorRef::from_array_view(&tensor)
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let (_, probabilities) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let (class_id, confidence) = argmax(probabilities)
            .ok_or_else(|| ClassifyError::Inference("empty output tensor".to_string()))?;

        let label = self
            .labels
            .get(&class_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());

        tracing::debug!(class_id, %label, confidence, "Classification complete");

        Ok(Prediction { label, confidence })
    }
}

fn argmax(row: &[f32]) -> Option<(usize, f32)> {
    row.iter()
        .enumerate()
        .fold(None, |best, (i, &p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((i, p)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_highest_probability() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
    }

    #[test]
    fn argmax_first_wins_on_tie() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some((0, 0.4)));
    }

    #[test]
    fn argmax_empty_is_none() {
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn load_requires_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxClassifier::load(dir.path());
        assert!(matches!(result, Err(ClassifyError::ModelNotFound(_))));
    }

    #[test]
    fn preprocess_produces_training_shape() {
        let img = image::RgbImage::from_pixel(64, 48, image::Rgb([255, 128, 0]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let tensor = OnnxClassifier::preprocess(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 128, 128, 3]);
        // Values are scaled into [0, 1]
        let max = tensor.iter().cloned().fold(0.0f32, f32::max);
        assert!(max <= 1.0);
        assert!(max > 0.9); // the 255 channel
    }

    #[test]
    fn preprocess_rejects_garbage() {
        let result = OnnxClassifier::preprocess(b"definitely not an image");
        assert!(matches!(result, Err(ClassifyError::ImageDecode(_))));
    }
}
