// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use crate::domain::prediction::PredictionSet;
use crate::error::Error;
use crate::media::ImageData;
use crate::ui::about;
use crate::ui::classifier;
use crate::ui::navbar;
use crate::ui::notifications;
use crate::ui::settings;
use std::path::PathBuf;

use super::Screen;

/// Top-level messages consumed by `App::update`. The variants forward
/// lower-level component messages while keeping a single update entrypoint.
#[derive(Debug, Clone)]
pub enum Message {
    Classifier(classifier::Message),
    Navbar(navbar::Message),
    Settings(settings::Message),
    About(about::Message),
    Notification(notifications::NotificationMessage),
    SwitchScreen(Screen),
    /// Result from the open file dialog.
    OpenFileDialogResult(Option<PathBuf>),
    /// A file was dropped on the window.
    FileDropped(PathBuf),
    /// Result from decoding an image file or a dropped path.
    ImageLoaded(Result<ImageData, Error>),
    /// Result from grabbing a camera frame.
    CaptureCompleted(Result<ImageData, Error>),
    /// Progress update during model download (0.0 - 1.0).
    ModelDownloadProgress(f32),
    /// Result from downloading the model and label table.
    ModelDownloadCompleted(Result<(), String>),
    /// Result from model validation.
    /// The boolean indicates a startup validation (true) vs user-initiated (false).
    ModelValidationCompleted {
        result: Result<(), String>,
        is_startup: bool,
    },
    /// Result from running inference on the current image.
    /// The generation identifies which image the result belongs to;
    /// results from a since-replaced image are dropped.
    ClassifyCompleted {
        generation: u64,
        result: Result<PredictionSet, String>,
    },
}

/// Runtime flags passed in from the CLI to tweak startup behavior.
#[derive(Debug, Default)]
pub struct Flags {
    /// Optional locale override in BCP-47 form (e.g. `ko`, `en-US`).
    pub lang: Option<String>,
    /// Optional image path to preload on startup.
    pub file_path: Option<String>,
    /// Optional data directory override (for model artifacts).
    /// Takes precedence over the `ICED_CLASSIFY_DATA_DIR` environment variable.
    pub data_dir: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over the `ICED_CLASSIFY_CONFIG_DIR` environment variable.
    pub config_dir: Option<String>,
}
