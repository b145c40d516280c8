// SPDX-License-Identifier: MPL-2.0
//! Top-K image classification using a pretrained ViT ONNX model.
//!
//! This module provides functionality for:
//! - Downloading the model and its ImageNet label table from configurable URLs
//! - Verifying model integrity with BLAKE3 checksum (when configured)
//! - Running inference to produce a ranked [`PredictionSet`]
//!
//! # Model Lifecycle
//!
//! The ONNX session is created once per [`ClassifierManager`] and reused for
//! every classification. The application holds a single manager behind
//! [`SharedClassifier`], so the model is loaded lazily on first use and then
//! lives for the process duration.

use crate::app::paths;
use crate::domain::{Prediction, PredictionSet};

pub mod labels;

pub use labels::LabelTable;

/// Filename for the downloaded classification model in the data directory.
const MODEL_FILENAME: &str = "vit-base-patch16-224.onnx";

/// Filename for the downloaded label table in the data directory.
const LABELS_FILENAME: &str = "synset.txt";

/// Input edge length expected by the ViT model (square input).
pub const MODEL_INPUT_EDGE: u32 = 224;

use image_rs::DynamicImage;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cancellation token type for background tasks.
pub type CancellationToken = Arc<AtomicBool>;

/// Checks if the cancellation token has been triggered.
#[inline]
pub fn is_cancelled(token: &CancellationToken) -> bool {
    token.load(Ordering::SeqCst)
}

/// Result type for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Errors that can occur during classification operations.
#[derive(Debug, Clone)]
pub enum ClassifyError {
    /// Model file not found at expected path.
    ModelNotFound,
    /// Label table not found at expected path.
    LabelsNotFound,
    /// Failed to download a model artifact.
    DownloadFailed(String),
    /// Model checksum verification failed.
    ChecksumMismatch { expected: String, actual: String },
    /// ONNX inference failed.
    InferenceFailed(String),
    /// Image preprocessing failed.
    PreprocessingFailed(String),
    /// Output postprocessing failed.
    PostprocessingFailed(String),
    /// Requested result count was zero.
    InvalidTopK,
    /// Operation was cancelled by user.
    Cancelled,
    /// IO error occurred.
    Io(String),
    /// Model session not initialized.
    SessionNotInitialized,
}

impl std::fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifyError::ModelNotFound => write!(f, "Model file not found"),
            ClassifyError::LabelsNotFound => write!(f, "Label table not found"),
            ClassifyError::DownloadFailed(msg) => write!(f, "Download failed: {msg}"),
            ClassifyError::ChecksumMismatch { expected, actual } => {
                write!(f, "Checksum mismatch: expected {expected}, got {actual}")
            }
            ClassifyError::InferenceFailed(msg) => write!(f, "Inference failed: {msg}"),
            ClassifyError::PreprocessingFailed(msg) => write!(f, "Preprocessing failed: {msg}"),
            ClassifyError::PostprocessingFailed(msg) => write!(f, "Postprocessing failed: {msg}"),
            ClassifyError::InvalidTopK => write!(f, "Result count must be at least 1"),
            ClassifyError::Cancelled => write!(f, "Operation cancelled"),
            ClassifyError::Io(msg) => write!(f, "IO error: {msg}"),
            ClassifyError::SessionNotInitialized => write!(f, "ONNX session not initialized"),
        }
    }
}

impl std::error::Error for ClassifyError {}

/// Status of the classification model.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModelStatus {
    /// Model has not been downloaded.
    #[default]
    NotDownloaded,
    /// Model is currently being downloaded.
    Downloading { progress: f32 },
    /// Model is being validated (checksum + test inference).
    Validating,
    /// Model is ready for use.
    Ready,
    /// An error occurred.
    Error(String),
}

/// Manager for the ViT classification model.
///
/// Handles model lifecycle: download, validation, and inference.
pub struct ClassifierManager {
    model_path: PathBuf,
    labels_path: PathBuf,
    session: Option<Session>,
    labels: LabelTable,
}

impl Default for ClassifierManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierManager {
    /// Creates a new `ClassifierManager` using the default artifact paths.
    #[must_use]
    pub fn new() -> Self {
        Self::with_paths(get_model_path(), get_labels_path())
    }

    /// Creates a manager with explicit artifact paths (used by tests).
    #[must_use]
    pub fn with_paths(model_path: PathBuf, labels_path: PathBuf) -> Self {
        Self {
            model_path,
            labels_path,
            session: None,
            labels: LabelTable::default(),
        }
    }

    /// Returns the path where the model is/will be stored.
    #[must_use]
    pub fn model_path(&self) -> &PathBuf {
        &self.model_path
    }

    /// Checks if both model artifacts exist on disk.
    #[must_use]
    pub fn is_model_downloaded(&self) -> bool {
        self.model_path.exists() && self.labels_path.exists()
    }

    /// Loads the ONNX session and the label table.
    ///
    /// Must be called after the artifacts are downloaded and verified.
    /// If a cancellation token is provided and triggered, returns
    /// `ClassifyError::Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact is missing, the operation is
    /// cancelled, or the ONNX session fails to initialize.
    pub fn load_session(&mut self, cancel_token: Option<&CancellationToken>) -> ClassifyResult<()> {
        if let Some(token) = cancel_token {
            if is_cancelled(token) {
                return Err(ClassifyError::Cancelled);
            }
        }

        if !self.model_path.exists() {
            return Err(ClassifyError::ModelNotFound);
        }
        if !self.labels_path.exists() {
            return Err(ClassifyError::LabelsNotFound);
        }

        self.labels =
            LabelTable::load(&self.labels_path).map_err(|_| ClassifyError::LabelsNotFound)?;

        let session = Session::builder()
            .map_err(|e| ClassifyError::InferenceFailed(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifyError::InferenceFailed(e.to_string()))?
            .commit_from_file(&self.model_path)
            .map_err(|e| ClassifyError::InferenceFailed(e.to_string()))?;

        self.session = Some(session);
        Ok(())
    }

    /// Checks if the ONNX session is loaded and ready.
    #[must_use]
    pub fn is_session_ready(&self) -> bool {
        self.session.is_some()
    }

    /// The loaded label table.
    #[must_use]
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Runs classification inference and returns the top `k` predictions.
    ///
    /// The result is sorted by descending score and capped at the model's
    /// class count, so it may be shorter than `k`.
    ///
    /// # Errors
    ///
    /// Returns an error if `k` is zero, the session is not initialized,
    /// preprocessing fails, or ONNX inference fails.
    pub fn classify(&mut self, image: &DynamicImage, k: usize) -> ClassifyResult<PredictionSet> {
        if k == 0 {
            return Err(ClassifyError::InvalidTopK);
        }

        let session = self
            .session
            .as_mut()
            .ok_or(ClassifyError::SessionNotInitialized)?;

        // Preprocess: DynamicImage -> NCHW tensor (RGB, ViT normalization)
        let input_tensor = preprocess_image(image)?;

        // Ensure standard layout for ONNX Runtime
        let input_tensor = input_tensor.as_standard_layout().into_owned();

        // Get input name from model (ViT exports typically use 'pixel_values')
        let input_name = session
            .inputs
            .first()
            .map_or_else(|| "pixel_values".to_string(), |i| i.name.clone());

        let input_ref = ort::value::TensorRef::from_array_view(&input_tensor)
            .map_err(|e| ClassifyError::InferenceFailed(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![input_name.as_str() => input_ref])
            .map_err(|e| ClassifyError::InferenceFailed(e.to_string()))?;

        // Postprocess: logits -> softmax -> ranked top-K
        let logits = extract_logits(&outputs)?;
        let probs = softmax(&logits);
        Ok(rank_top_k(&probs, &self.labels, k))
    }
}

/// Returns the path where the classification model should be stored.
#[must_use]
pub fn get_model_path() -> PathBuf {
    artifact_path(MODEL_FILENAME)
}

/// Returns the path where the label table should be stored.
#[must_use]
pub fn get_labels_path() -> PathBuf {
    artifact_path(LABELS_FILENAME)
}

fn artifact_path(filename: &str) -> PathBuf {
    paths::get_app_data_dir().map_or_else(
        || PathBuf::from(filename),
        |mut p| {
            p.push(filename);
            p
        },
    )
}

/// Minimum expected model size (30 MB) to detect failed downloads.
///
/// Well below a full fp32 ViT export (~330 MB) so quantized exports pass,
/// but far above any HTML error page.
const MIN_MODEL_SIZE_BYTES: u64 = 30_000_000;

/// Minimum expected label table size (1 KB).
const MIN_LABELS_SIZE_BYTES: u64 = 1_000;

/// Checks if both artifacts exist at the expected locations with valid sizes.
#[must_use]
pub fn is_model_downloaded() -> bool {
    file_has_min_size(&get_model_path(), MIN_MODEL_SIZE_BYTES)
        && file_has_min_size(&get_labels_path(), MIN_LABELS_SIZE_BYTES)
}

fn file_has_min_size(path: &Path, min_bytes: u64) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.len() >= min_bytes,
        Err(_) => false,
    }
}

/// Downloads the model from the specified URL.
///
/// Returns the number of bytes downloaded.
///
/// # Errors
///
/// Returns an error if the download fails or the file cannot be written.
pub async fn download_model(
    url: &str,
    progress_callback: impl FnMut(f32) + Send,
) -> ClassifyResult<u64> {
    download_file(url, &get_model_path(), MIN_MODEL_SIZE_BYTES, progress_callback).await
}

/// Downloads the label table from the specified URL.
///
/// # Errors
///
/// Returns an error if the download fails or the file cannot be written.
pub async fn download_labels(
    url: &str,
    progress_callback: impl FnMut(f32) + Send,
) -> ClassifyResult<u64> {
    download_file(url, &get_labels_path(), MIN_LABELS_SIZE_BYTES, progress_callback).await
}

/// Streams a download to `dest`, reporting progress in `0.0..=1.0`.
async fn download_file(
    url: &str,
    dest: &Path,
    min_bytes: u64,
    mut progress_callback: impl FnMut(f32) + Send,
) -> ClassifyResult<u64> {
    use futures_util::StreamExt;

    // Build client with explicit redirect policy and user agent
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent("IcedClassify/0.1.0")
        .build()
        .map_err(|e| ClassifyError::DownloadFailed(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ClassifyError::DownloadFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ClassifyError::DownloadFailed(format!(
            "HTTP status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    // Sanity check: a suspiciously small response is an error page, not the artifact
    if total_size > 0 && total_size < min_bytes {
        return Err(ClassifyError::DownloadFailed(format!(
            "Response too small ({total_size} bytes). URL may have changed or returned an error page."
        )));
    }

    // Ensure parent directory exists
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ClassifyError::Io(e.to_string()))?;
    }

    let mut file = std::fs::File::create(dest).map_err(|e| ClassifyError::Io(e.to_string()))?;

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ClassifyError::DownloadFailed(e.to_string()))?;
        std::io::Write::write_all(&mut file, &chunk)
            .map_err(|e| ClassifyError::Io(e.to_string()))?;

        downloaded += chunk.len() as u64;

        if total_size > 0 {
            // f64 to f32 truncation is fine for progress display (0.0-1.0 range)
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let progress = (downloaded as f64 / total_size as f64) as f32;
            progress_callback(progress);
        }
    }

    // Final size check
    if downloaded < min_bytes {
        // Delete the incomplete/invalid file
        let _ = std::fs::remove_file(dest);
        return Err(ClassifyError::DownloadFailed(format!(
            "Downloaded file too small ({downloaded} bytes)"
        )));
    }

    Ok(downloaded)
}

/// Verifies the model file integrity using BLAKE3 hash.
///
/// # Errors
///
/// Returns an error if the model file is not found, cannot be read,
/// or the checksum does not match.
pub fn verify_checksum(expected_hash: &str) -> ClassifyResult<()> {
    let actual_hash = compute_model_hash()?;
    if actual_hash != expected_hash {
        return Err(ClassifyError::ChecksumMismatch {
            expected: expected_hash.to_string(),
            actual: actual_hash,
        });
    }
    Ok(())
}

/// Computes the BLAKE3 hash of the model file.
///
/// # Errors
///
/// Returns an error if the model file is not found or cannot be read.
pub fn compute_model_hash() -> ClassifyResult<String> {
    let model_path = get_model_path();
    if !model_path.exists() {
        return Err(ClassifyError::ModelNotFound);
    }

    let file_data = std::fs::read(&model_path).map_err(|e| ClassifyError::Io(e.to_string()))?;
    Ok(blake3::hash(&file_data).to_hex().to_string())
}

/// Validates the model by running a test inference on a synthetic image.
///
/// If a cancellation token is provided and triggered, returns
/// `ClassifyError::Cancelled`.
///
/// # Errors
///
/// Returns an error if validation is cancelled, the inference fails, or the
/// model produces no predictions.
pub fn validate_model(
    manager: &mut ClassifierManager,
    cancel_token: Option<&CancellationToken>,
) -> ClassifyResult<()> {
    if let Some(token) = cancel_token {
        if is_cancelled(token) {
            return Err(ClassifyError::Cancelled);
        }
    }

    let mut img = image_rs::RgbImage::new(MODEL_INPUT_EDGE, MODEL_INPUT_EDGE);
    for pixel in img.pixels_mut() {
        *pixel = image_rs::Rgb([128, 128, 128]); // Gray
    }
    let test_image = DynamicImage::ImageRgb8(img);

    // Check again before inference (which is atomic and cannot be interrupted)
    if let Some(token) = cancel_token {
        if is_cancelled(token) {
            return Err(ClassifyError::Cancelled);
        }
    }

    let result = manager.classify(&test_image, 5)?;
    if result.is_empty() {
        return Err(ClassifyError::InferenceFailed(
            "Model produced no predictions".to_string(),
        ));
    }

    Ok(())
}

/// Preprocesses an image for ViT inference.
///
/// Resizes to the model input edge, converts to NCHW format
/// (batch=1, channels=3, height, width) in RGB order, and applies the ViT
/// normalization `(x / 255 - 0.5) / 0.5`, mapping pixels into `[-1, 1]`.
#[allow(clippy::unnecessary_wraps)] // Result for API consistency with other processing functions
pub fn preprocess_image(img: &DynamicImage) -> ClassifyResult<Array4<f32>> {
    let resized = img.resize_exact(
        MODEL_INPUT_EDGE,
        MODEL_INPUT_EDGE,
        image_rs::imageops::FilterType::Triangle,
    );
    let rgb = resized.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        tensor[[0, 0, y as usize, x as usize]] = (f32::from(r) / 255.0 - 0.5) / 0.5;
        tensor[[0, 1, y as usize, x as usize]] = (f32::from(g) / 255.0 - 0.5) / 0.5;
        tensor[[0, 2, y as usize, x as usize]] = (f32::from(b) / 255.0 - 0.5) / 0.5;
    }

    Ok(tensor)
}

/// Extracts the logit vector from the model output.
///
/// Accepts `[classes]` or `[1, classes]` shaped tensors.
fn extract_logits(outputs: &ort::session::SessionOutputs<'_>) -> ClassifyResult<Vec<f32>> {
    let (_, output) = outputs
        .iter()
        .next()
        .ok_or_else(|| ClassifyError::PostprocessingFailed("No output tensor".to_string()))?;

    let (shape, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e: ort::Error| ClassifyError::PostprocessingFailed(e.to_string()))?;

    match shape.len() {
        1 | 2 => Ok(data.to_vec()),
        dims => Err(ClassifyError::PostprocessingFailed(format!(
            "Expected 1D or 2D logits, got {dims}D"
        ))),
    }
}

/// Numerically stable softmax over raw logits.
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Ranks class probabilities and returns the top `k` as a [`PredictionSet`].
///
/// Caps at the available class count when `k` exceeds it.
#[must_use]
pub fn rank_top_k(probs: &[f32], labels: &LabelTable, k: usize) -> PredictionSet {
    let mut indices: Vec<usize> = (0..probs.len()).collect();
    indices.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]));

    let items = indices
        .into_iter()
        .take(k)
        .map(|i| Prediction::new(labels.label_for(i), probs[i]))
        .collect();

    PredictionSet::from_unsorted(items)
}

/// Thread-safe shared handle to the process-wide classifier.
pub type SharedClassifier = Arc<Mutex<ClassifierManager>>;

/// Creates the shared classifier instance held by the application.
#[must_use]
pub fn create_shared_classifier() -> SharedClassifier {
    Arc::new(Mutex::new(ClassifierManager::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_path_contains_filename() {
        let path = get_model_path();
        assert!(path.to_string_lossy().contains(MODEL_FILENAME));
    }

    #[test]
    fn model_status_default_is_not_downloaded() {
        let status = ModelStatus::default();
        assert_eq!(status, ModelStatus::NotDownloaded);
    }

    #[test]
    fn classify_error_display() {
        let err = ClassifyError::ModelNotFound;
        assert_eq!(err.to_string(), "Model file not found");

        let err = ClassifyError::Cancelled;
        assert_eq!(err.to_string(), "Operation cancelled");
    }

    #[test]
    fn preprocess_image_creates_model_input_shape() {
        let img = DynamicImage::new_rgb8(640, 480);
        let tensor = preprocess_image(&img).unwrap();
        assert_eq!(
            tensor.shape(),
            &[1, 3, MODEL_INPUT_EDGE as usize, MODEL_INPUT_EDGE as usize]
        );
    }

    #[test]
    fn preprocess_image_normalizes_to_unit_range() {
        let mut img = image_rs::RgbImage::new(
            MODEL_INPUT_EDGE,
            MODEL_INPUT_EDGE,
        );
        for pixel in img.pixels_mut() {
            *pixel = image_rs::Rgb([255, 128, 0]);
        }
        let dynamic = DynamicImage::ImageRgb8(img);

        let tensor = preprocess_image(&dynamic).unwrap();

        // (255/255 - 0.5) / 0.5 = 1.0, (128/255 - 0.5) / 0.5 ~ 0.004, (0 - 0.5) / 0.5 = -1.0
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
        assert!(tensor[[0, 1, 0, 0]].abs() < 0.01);
        assert!((tensor[[0, 2, 0, 0]] + 1.0).abs() < 0.01);
    }

    #[test]
    fn softmax_sums_to_one_and_preserves_order() {
        let probs = softmax(&[2.0, 1.0, 0.1]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 999.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn softmax_of_empty_is_empty() {
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn rank_top_k_returns_sorted_predictions() {
        let labels = LabelTable::parse("tabby cat\ntiger cat\nEgyptian cat\n");
        let set = rank_top_k(&[0.05, 0.91, 0.02], &labels, 3);

        assert_eq!(set.len(), 3);
        assert_eq!(set.top().unwrap().label(), "tiger cat");
        let scores: Vec<f32> = set.iter().map(|p| p.score()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn rank_top_k_caps_at_class_count() {
        let labels = LabelTable::parse("a\nb\n");
        let set = rank_top_k(&[0.6, 0.4], &labels, 10);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rank_top_k_with_k_one_returns_single_headline() {
        let labels = LabelTable::parse("a\nb\nc\n");
        let set = rank_top_k(&[0.1, 0.2, 0.7], &labels, 1);
        assert_eq!(set.len(), 1);
        assert_eq!(set.top().unwrap().label(), "c");
    }

    #[test]
    fn classify_fails_when_session_not_loaded() {
        let mut manager = ClassifierManager::new();
        let img = DynamicImage::new_rgb8(10, 10);
        let result = manager.classify(&img, 5);
        assert!(matches!(result, Err(ClassifyError::SessionNotInitialized)));
    }

    #[test]
    fn classify_rejects_zero_k() {
        let mut manager = ClassifierManager::new();
        let img = DynamicImage::new_rgb8(10, 10);
        let result = manager.classify(&img, 0);
        assert!(matches!(result, Err(ClassifyError::InvalidTopK)));
    }

    #[test]
    fn load_session_fails_without_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = ClassifierManager::with_paths(
            dir.path().join("missing.onnx"),
            dir.path().join("missing.txt"),
        );
        assert!(matches!(
            manager.load_session(None),
            Err(ClassifyError::ModelNotFound)
        ));
        assert!(!manager.is_session_ready());
    }

    #[test]
    fn load_session_respects_cancellation() {
        let mut manager = ClassifierManager::new();
        let token: CancellationToken = Arc::new(AtomicBool::new(true));
        assert!(matches!(
            manager.load_session(Some(&token)),
            Err(ClassifyError::Cancelled)
        ));
    }

    #[test]
    fn manager_not_ready_by_default() {
        let manager = ClassifierManager::new();
        assert!(!manager.is_session_ready());
        assert!(manager.labels().is_empty());
    }
}
