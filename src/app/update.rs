// SPDX-License-Identifier: MPL-2.0
//! Message handling for the application.
//!
//! Translates top-level [`Message`]s into state changes and async tasks:
//! file dialogs, camera capture, model download with streamed progress,
//! validation, and inference.

use super::{App, Message, Screen};
use crate::classifier::{self, ClassifyError, ModelStatus};
use crate::config;
use crate::domain::prediction::TOP_K_MAX;
use crate::error::Error;
use crate::media::{self, ImageData};
use crate::ui::about;
use crate::ui::classifier::{self as classifier_screen, ErrorKind};
use crate::ui::navbar;
use crate::ui::notifications::Notification;
use crate::ui::settings;
use iced::Task;
use std::path::PathBuf;

impl App {
    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navbar(msg) => {
                match navbar::update(msg, &mut self.menu_open) {
                    navbar::Event::None => {}
                    navbar::Event::OpenSettings => self.screen = Screen::Settings,
                    navbar::Event::OpenAbout => self.screen = Screen::About,
                }
                Task::none()
            }
            Message::Classifier(msg) => self.handle_classifier_message(msg),
            Message::Settings(msg) => self.handle_settings_message(msg),
            Message::About(about::Message::Back) => {
                self.screen = Screen::Classifier;
                Task::none()
            }
            Message::Notification(msg) => {
                self.notifications.handle_message(&msg);
                Task::none()
            }
            Message::SwitchScreen(screen) => {
                self.screen = screen;
                Task::none()
            }
            Message::OpenFileDialogResult(Some(path)) => Self::load_image_task(path),
            Message::OpenFileDialogResult(None) => Task::none(),
            Message::FileDropped(path) => self.handle_file_dropped(path),
            Message::ImageLoaded(result) => {
                self.handle_image_result(result, ErrorKind::Decode);
                Task::none()
            }
            Message::CaptureCompleted(result) => {
                if cfg!(not(feature = "camera")) && result.is_err() {
                    self.notifications
                        .push(Notification::warning("notify-capture-unavailable"));
                }
                self.handle_image_result(result, ErrorKind::Capture);
                Task::none()
            }
            Message::ModelDownloadProgress(progress) => {
                self.classifier_screen
                    .set_model_status(ModelStatus::Downloading { progress });
                Task::none()
            }
            Message::ModelDownloadCompleted(result) => self.handle_download_completed(result),
            Message::ModelValidationCompleted { result, is_startup } => {
                self.handle_validation_completed(result, is_startup);
                Task::none()
            }
            Message::ClassifyCompleted { generation, result } => {
                if generation != self.classifier_screen.classify_generation() {
                    // The image was replaced while inference ran; these
                    // results belong to the discarded image.
                    return Task::none();
                }
                match result {
                    Ok(predictions) => self.classifier_screen.set_predictions(predictions),
                    Err(details) => self
                        .classifier_screen
                        .set_error(ErrorKind::Classify, details),
                }
                Task::none()
            }
        }
    }

    fn handle_classifier_message(&mut self, msg: classifier_screen::Message) -> Task<Message> {
        match classifier_screen::update(&mut self.classifier_screen, msg) {
            classifier_screen::Event::None => Task::none(),
            classifier_screen::Event::OpenFileDialog => open_file_dialog_task(),
            classifier_screen::Event::CaptureFrame => self.capture_task(),
            classifier_screen::Event::Classify => self.start_classification(),
            classifier_screen::Event::DownloadModel => self.start_model_download(),
            classifier_screen::Event::TopKChanged(k) => {
                self.config.top_k = Some(k);
                self.persist_config();
                Task::none()
            }
        }
    }

    fn handle_settings_message(&mut self, msg: settings::Message) -> Task<Message> {
        match msg {
            settings::Message::LanguageSelected(locale) => {
                self.config.language = Some(locale.to_string());
                self.i18n.set_locale(locale);
                self.persist_config();
            }
            settings::Message::ThemeModeSelected(mode) => {
                self.theme_mode = mode;
                self.config.theme_mode = Some(mode);
                self.persist_config();
            }
            settings::Message::Back => self.screen = Screen::Classifier,
        }
        Task::none()
    }

    fn handle_file_dropped(&mut self, path: PathBuf) -> Task<Message> {
        if self.screen != Screen::Classifier {
            return Task::none();
        }

        if media::is_supported_extension(&path) {
            Self::load_image_task(path)
        } else {
            self.classifier_screen.set_error(
                ErrorKind::Decode,
                format!("unsupported file extension: {}", path.display()),
            );
            Task::none()
        }
    }

    fn handle_image_result(&mut self, result: Result<ImageData, Error>, kind: ErrorKind) {
        match result {
            Ok(image) => self.classifier_screen.set_image(image),
            Err(e) => self.classifier_screen.set_error(kind, e.to_string()),
        }
    }

    /// Grabs one frame from the configured camera device off the UI thread.
    fn capture_task(&self) -> Task<Message> {
        let device = self.config.camera_device().to_string();
        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || media::capture::capture_frame(&device))
                    .await
                    .map_err(|e| Error::Capture(e.to_string()))?
            },
            Message::CaptureCompleted,
        )
    }

    /// Runs inference in a blocking task to avoid stalling the UI.
    ///
    /// The full ranking (up to [`TOP_K_MAX`] entries) is requested so the
    /// slider can reveal more results without re-running the model.
    fn start_classification(&mut self) -> Task<Message> {
        let Some(image) = self.classifier_screen.image() else {
            return Task::none();
        };

        let dynamic = match image.to_dynamic() {
            Ok(img) => img,
            Err(e) => {
                self.classifier_screen
                    .set_error(ErrorKind::Classify, e.to_string());
                return Task::none();
            }
        };

        self.classifier_screen.set_classifying(true);

        let generation = self.classifier_screen.classify_generation();
        let shared = self.classifier.clone();
        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || {
                    let mut manager = shared.blocking_lock();
                    if !manager.is_session_ready() {
                        manager.load_session(None)?;
                    }
                    manager.classify(&dynamic, TOP_K_MAX as usize)
                })
                .await
                .map_err(|e| ClassifyError::InferenceFailed(e.to_string()))?
            },
            move |result| Message::ClassifyCompleted {
                generation,
                result: result.map_err(|e| e.to_string()),
            },
        )
    }

    /// Starts the model and label table download, streaming progress updates
    /// back into the update loop.
    fn start_model_download(&mut self) -> Task<Message> {
        use iced::futures::channel::{mpsc, oneshot};

        self.classifier_screen
            .set_model_status(ModelStatus::Downloading { progress: 0.0 });

        let model_url = self.config.model_url().to_string();
        let labels_url = self.config.labels_url().to_string();

        // Channels for progress and result
        let (progress_tx, progress_rx) = mpsc::channel::<f32>(100);
        let (result_tx, result_rx) = oneshot::channel::<Result<(), String>>();

        tokio::spawn(async move {
            let mut progress_tx = progress_tx;
            let result = async {
                classifier::download_model(&model_url, |progress| {
                    let _ = progress_tx.try_send(progress);
                })
                .await?;
                // The label table is a few KB; no need for progress reporting
                classifier::download_labels(&labels_url, |_| {}).await?;
                Ok::<(), ClassifyError>(())
            }
            .await;

            let _ = result_tx.send(result.map_err(|e| e.to_string()));
            // progress_tx is dropped here, closing the channel
        });

        Task::stream(download_message_stream(progress_rx, result_rx))
    }

    /// Handles the result of the model download.
    fn handle_download_completed(&mut self, result: Result<(), String>) -> Task<Message> {
        match result {
            Ok(()) => {
                self.classifier_screen
                    .set_model_status(ModelStatus::Validating);
                self.validation_task(false)
            }
            Err(e) => {
                self.classifier_screen
                    .set_model_status(ModelStatus::Error(e.clone()));
                self.notifications
                    .push(Notification::error("model-status-error").with_arg("error", e));
                Task::none()
            }
        }
    }

    /// Verifies the downloaded artifacts and runs a test inference.
    ///
    /// The checksum is only checked when one is configured.
    pub(super) fn validation_task(&self, is_startup: bool) -> Task<Message> {
        let shared = self.classifier.clone();
        let checksum = self.config.model_checksum.clone();

        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || {
                    if let Some(expected) = checksum.as_deref() {
                        classifier::verify_checksum(expected)?;
                    }
                    let mut manager = shared.blocking_lock();
                    manager.load_session(None)?;
                    classifier::validate_model(&mut manager, None)?;
                    Ok::<(), ClassifyError>(())
                })
                .await
                .map_err(|e| ClassifyError::InferenceFailed(e.to_string()))?
            },
            move |result| match result {
                Ok(()) => Message::ModelValidationCompleted {
                    result: Ok(()),
                    is_startup,
                },
                Err(e) => Message::ModelValidationCompleted {
                    result: Err(e.to_string()),
                    is_startup,
                },
            },
        )
    }

    /// Handles the result of model validation.
    ///
    /// When `is_startup` is true, success notifications are suppressed (the
    /// user expects the model to work from previous sessions). Failure
    /// notifications are always shown.
    fn handle_validation_completed(&mut self, result: Result<(), String>, is_startup: bool) {
        match result {
            Ok(()) => {
                self.classifier_screen.set_model_status(ModelStatus::Ready);
                if !is_startup {
                    self.notifications
                        .push(Notification::success("notify-model-ready"));
                }
            }
            Err(e) => {
                self.classifier_screen
                    .set_model_status(ModelStatus::Error(e.clone()));
                self.notifications
                    .push(Notification::error("model-status-error").with_arg("error", e));
            }
        }
    }

    fn persist_config(&mut self) {
        if config::save(&self.config).is_err() {
            self.notifications
                .push(Notification::warning("notify-config-save-warning"));
        }
    }
}

/// Opens the system file dialog filtered to supported image formats.
fn open_file_dialog_task() -> Task<Message> {
    Task::perform(
        async {
            rfd::AsyncFileDialog::new()
                .add_filter("Images", &media::image::SUPPORTED_EXTENSIONS)
                .pick_file()
                .await
                .map(|h| h.path().to_path_buf())
        },
        Message::OpenFileDialogResult,
    )
}

/// Turns the download worker's channels into a message stream: one
/// `ModelDownloadProgress` per received update, then a single
/// `ModelDownloadCompleted` once the progress channel closes. No progress
/// value is synthesized on close, so a failed download never shows a full
/// bar before the error status.
fn download_message_stream(
    progress_rx: iced::futures::channel::mpsc::Receiver<f32>,
    result_rx: iced::futures::channel::oneshot::Receiver<Result<(), String>>,
) -> impl iced::futures::Stream<Item = Message> {
    use iced::futures::channel::{mpsc, oneshot};
    use iced::futures::stream;
    use iced::futures::StreamExt;

    enum DownloadPhase {
        ReceivingProgress {
            progress_rx: mpsc::Receiver<f32>,
            result_rx: oneshot::Receiver<Result<(), String>>,
        },
        Completed,
    }

    stream::unfold(
        DownloadPhase::ReceivingProgress {
            progress_rx,
            result_rx,
        },
        |phase| async move {
            match phase {
                DownloadPhase::ReceivingProgress {
                    mut progress_rx,
                    result_rx,
                } => match progress_rx.next().await {
                    Some(progress) => Some((
                        Message::ModelDownloadProgress(progress),
                        DownloadPhase::ReceivingProgress {
                            progress_rx,
                            result_rx,
                        },
                    )),
                    // Progress channel closed, the worker's result is next
                    None => match result_rx.await {
                        Ok(result) => Some((
                            Message::ModelDownloadCompleted(result),
                            DownloadPhase::Completed,
                        )),
                        Err(_) => Some((
                            Message::ModelDownloadCompleted(Err(
                                "Download task cancelled".to_string()
                            )),
                            DownloadPhase::Completed,
                        )),
                    },
                },
                DownloadPhase::Completed => None, // Terminate the stream
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::{Prediction, PredictionSet};

    fn sample_image() -> ImageData {
        ImageData::from_rgba(2, 2, vec![255; 16])
    }

    #[test]
    fn navbar_settings_event_switches_screen() {
        let mut app = App::default();
        let _ = app.update(Message::Navbar(navbar::Message::OpenSettings));
        assert_eq!(app.screen, Screen::Settings);
    }

    #[test]
    fn settings_back_returns_to_classifier() {
        let mut app = App::default();
        app.screen = Screen::Settings;
        let _ = app.update(Message::Settings(settings::Message::Back));
        assert_eq!(app.screen, Screen::Classifier);
    }

    #[test]
    fn about_back_returns_to_classifier() {
        let mut app = App::default();
        app.screen = Screen::About;
        let _ = app.update(Message::About(about::Message::Back));
        assert_eq!(app.screen, Screen::Classifier);
    }

    #[test]
    fn image_loaded_ok_sets_image() {
        let mut app = App::default();
        let _ = app.update(Message::ImageLoaded(Ok(sample_image())));
        assert!(app.classifier_screen.image().is_some());
    }

    #[test]
    fn image_loaded_err_keeps_empty_state() {
        let mut app = App::default();
        let _ = app.update(Message::ImageLoaded(Err(Error::Decode("bad file".into()))));
        assert!(app.classifier_screen.image().is_none());
    }

    #[test]
    fn download_progress_updates_status() {
        let mut app = App::default();
        let _ = app.update(Message::ModelDownloadProgress(0.5));
        assert!(matches!(
            app.classifier_screen.model_status(),
            ModelStatus::Downloading { progress } if (progress - 0.5).abs() < f32::EPSILON
        ));
    }

    #[test]
    fn download_failure_sets_error_status_and_notifies() {
        let mut app = App::default();
        let _ = app.update(Message::ModelDownloadCompleted(Err("HTTP 404".into())));
        assert!(matches!(
            app.classifier_screen.model_status(),
            ModelStatus::Error(_)
        ));
        assert!(app.notifications.has_notifications());
    }

    #[test]
    fn startup_validation_success_is_silent() {
        let mut app = App::default();
        let _ = app.update(Message::ModelValidationCompleted {
            result: Ok(()),
            is_startup: true,
        });
        assert!(matches!(
            app.classifier_screen.model_status(),
            ModelStatus::Ready
        ));
        assert!(!app.notifications.has_notifications());
    }

    #[test]
    fn user_validation_success_notifies() {
        let mut app = App::default();
        let _ = app.update(Message::ModelValidationCompleted {
            result: Ok(()),
            is_startup: false,
        });
        assert!(app.notifications.has_notifications());
    }

    #[test]
    fn classify_completed_stores_predictions() {
        let mut app = App::default();
        let _ = app.update(Message::ImageLoaded(Ok(sample_image())));
        let predictions = PredictionSet::from_unsorted(vec![
            Prediction::new("tabby cat", 0.91),
            Prediction::new("tiger cat", 0.05),
        ]);
        let _ = app.update(Message::ClassifyCompleted {
            generation: app.classifier_screen.classify_generation(),
            result: Ok(predictions),
        });
        assert!(app.classifier_screen.predictions().is_some());
        assert!(!app.classifier_screen.is_classifying());
    }

    #[test]
    fn classify_completed_for_replaced_image_is_dropped() {
        let mut app = App::default();
        let _ = app.update(Message::ImageLoaded(Ok(sample_image())));
        let stale_generation = app.classifier_screen.classify_generation();
        app.classifier_screen.set_classifying(true);

        // A new image arrives while inference against the old one is running.
        let _ = app.update(Message::ImageLoaded(Ok(sample_image())));

        let predictions =
            PredictionSet::from_unsorted(vec![Prediction::new("goldfish", 0.88)]);
        let _ = app.update(Message::ClassifyCompleted {
            generation: stale_generation,
            result: Ok(predictions),
        });
        assert!(app.classifier_screen.predictions().is_none());
        assert!(!app.classifier_screen.is_classifying());
    }

    #[test]
    fn stale_classify_error_is_dropped() {
        let mut app = App::default();
        let _ = app.update(Message::ImageLoaded(Ok(sample_image())));
        let stale_generation = app.classifier_screen.classify_generation();
        let _ = app.update(Message::ImageLoaded(Ok(sample_image())));

        let _ = app.update(Message::ClassifyCompleted {
            generation: stale_generation,
            result: Err("session dropped".into()),
        });
        assert!(app.classifier_screen.error().is_none());
    }

    #[test]
    fn dropped_file_with_unknown_extension_is_rejected() {
        let mut app = App::default();
        let _ = app.update(Message::FileDropped(PathBuf::from("notes.txt")));
        assert!(app.classifier_screen.image().is_none());
    }

    #[test]
    fn file_drop_outside_classifier_screen_is_ignored() {
        let mut app = App::default();
        app.screen = Screen::Settings;
        let _ = app.update(Message::FileDropped(PathBuf::from("photo.jpg")));
        assert!(app.classifier_screen.image().is_none());
    }

    #[tokio::test]
    async fn failed_download_stream_skips_full_progress_tick() {
        use iced::futures::channel::{mpsc, oneshot};
        use iced::futures::StreamExt;

        let (mut progress_tx, progress_rx) = mpsc::channel::<f32>(100);
        let (result_tx, result_rx) = oneshot::channel::<Result<(), String>>();

        progress_tx.try_send(0.3).expect("send progress");
        result_tx
            .send(Err("HTTP 404".to_string()))
            .expect("send result");
        drop(progress_tx);

        let messages: Vec<Message> =
            download_message_stream(progress_rx, result_rx).collect().await;

        assert_eq!(messages.len(), 2);
        assert!(matches!(
            messages[0],
            Message::ModelDownloadProgress(p) if (p - 0.3).abs() < f32::EPSILON
        ));
        assert!(matches!(
            messages[1],
            Message::ModelDownloadCompleted(Err(_))
        ));
    }

    #[test]
    fn theme_selection_updates_mode() {
        let mut app = App::default();
        let _ = app.update(Message::Settings(settings::Message::ThemeModeSelected(
            crate::ui::theme::ThemeMode::Dark,
        )));
        assert_eq!(app.theme_mode, crate::ui::theme::ThemeMode::Dark);
    }
}
