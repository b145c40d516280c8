// SPDX-License-Identifier: MPL-2.0
//! Main classification screen.
//!
//! Hosts the input image pane, the prediction results, and the sidebar
//! with source controls, the top-K slider, and the model status panel.
//! The component owns its display state; all IO (file dialogs, camera
//! capture, model download, inference) is delegated to the parent via
//! [`Event`]s.

pub mod empty_state;
pub mod results;
pub mod sidebar;

use crate::classifier::ModelStatus;
use crate::domain::prediction::{PredictionSet, TOP_K_DEFAULT, TOP_K_MAX, TOP_K_MIN};
use crate::i18n::fluent::I18n;
use crate::media::image::ImageData;
use crate::ui::components::error_display::{ErrorDisplay, ErrorSeverity};
use crate::ui::design_tokens::{sizing, spacing, typography};
use crate::ui::styles;
use iced::widget::{scrollable, Column, Container, Image, Row, Text};
use iced::{alignment, Element, Length};

/// Where a displayed error came from; decides which headline key is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Capture,
    Classify,
}

impl ErrorKind {
    fn title_key(self) -> &'static str {
        match self {
            ErrorKind::Decode => "error-decode-title",
            ErrorKind::Capture => "error-capture-title",
            ErrorKind::Classify => "error-classify-title",
        }
    }
}

/// Display state for the classification screen.
#[derive(Debug)]
pub struct State {
    image: Option<ImageData>,
    /// Full ranked prediction set; the view truncates it to `top_k`.
    predictions: Option<PredictionSet>,
    top_k: u8,
    model_status: ModelStatus,
    is_classifying: bool,
    /// Bumped on every image change; inference results carrying an older
    /// generation belong to a discarded image and are dropped.
    classify_generation: u64,
    error: Option<(ErrorKind, String)>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            image: None,
            predictions: None,
            top_k: TOP_K_DEFAULT,
            model_status: ModelStatus::NotDownloaded,
            is_classifying: false,
            classify_generation: 0,
            error: None,
        }
    }
}

impl State {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current image and clears stale results and errors.
    ///
    /// Any inference still running against the previous image is
    /// invalidated: its completion will carry an older generation and
    /// gets dropped on arrival.
    pub fn set_image(&mut self, image: ImageData) {
        self.image = Some(image);
        self.predictions = None;
        self.error = None;
        self.is_classifying = false;
        self.classify_generation = self.classify_generation.wrapping_add(1);
    }

    /// Generation of the current image, used to fence inference results.
    pub fn classify_generation(&self) -> u64 {
        self.classify_generation
    }

    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    pub fn set_predictions(&mut self, predictions: PredictionSet) {
        self.predictions = Some(predictions);
        self.is_classifying = false;
        self.error = None;
    }

    pub fn predictions(&self) -> Option<&PredictionSet> {
        self.predictions.as_ref()
    }

    pub fn top_k(&self) -> u8 {
        self.top_k
    }

    pub fn model_status(&self) -> &ModelStatus {
        &self.model_status
    }

    pub fn set_model_status(&mut self, status: ModelStatus) {
        self.model_status = status;
    }

    pub fn set_classifying(&mut self, in_progress: bool) {
        self.is_classifying = in_progress;
    }

    pub fn is_classifying(&self) -> bool {
        self.is_classifying
    }

    pub fn set_error(&mut self, kind: ErrorKind, details: String) {
        self.is_classifying = false;
        self.error = Some((kind, details));
    }

    pub fn error(&self) -> Option<&(ErrorKind, String)> {
        self.error.as_ref()
    }

    pub fn set_top_k_from_config(&mut self, k: u8) {
        self.top_k = k.clamp(TOP_K_MIN, TOP_K_MAX);
    }
}

/// Messages handled by the classification screen.
#[derive(Debug, Clone)]
pub enum Message {
    OpenFilePressed,
    CapturePressed,
    TopKChanged(u8),
    ClassifyPressed,
    DownloadModelPressed,
}

/// Events propagated to the parent application.
#[derive(Debug, Clone)]
pub enum Event {
    None,
    /// Open the system file dialog.
    OpenFileDialog,
    /// Grab a frame from the configured camera device.
    CaptureFrame,
    /// Run inference on the current image.
    Classify,
    /// Start the model download.
    DownloadModel,
    /// The slider moved; parent may persist the value.
    TopKChanged(u8),
}

/// Process a screen message and return the corresponding event.
pub fn update(state: &mut State, message: Message) -> Event {
    match message {
        Message::OpenFilePressed => Event::OpenFileDialog,
        Message::CapturePressed => Event::CaptureFrame,
        Message::TopKChanged(k) => {
            state.top_k = k.clamp(TOP_K_MIN, TOP_K_MAX);
            Event::TopKChanged(state.top_k)
        }
        Message::ClassifyPressed => {
            if state.image.is_some() && !state.is_classifying {
                Event::Classify
            } else {
                Event::None
            }
        }
        Message::DownloadModelPressed => Event::DownloadModel,
    }
}

/// Render the classification screen: content pane on the left, sidebar on
/// the right.
pub fn view<'a>(state: &'a State, i18n: &'a I18n) -> Element<'a, Message> {
    let content: Element<'a, Message> = match (&state.image, &state.error) {
        (Some(image), _) => image_and_results(state, image, i18n),
        // A decode or capture failure can happen before any image is shown.
        (None, Some((kind, details))) => Container::new(inline_error(*kind, details, i18n))
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center)
            .into(),
        (None, None) => empty_state::view(i18n),
    };

    let sidebar = Container::new(sidebar::view(state, i18n))
        .width(Length::Fixed(sizing::SIDEBAR_WIDTH))
        .height(Length::Fill)
        .padding(spacing::MD)
        .style(styles::container::panel);

    Row::new()
        .push(
            Container::new(content)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(alignment::Horizontal::Center)
                .align_y(alignment::Vertical::Top)
                .padding(spacing::MD),
        )
        .push(sidebar)
        .into()
}

/// The loaded image with its caption, any inline error, and the results.
fn image_and_results<'a>(
    state: &'a State,
    image: &'a ImageData,
    i18n: &'a I18n,
) -> Element<'a, Message> {
    let picture = Image::new(image.handle.clone())
        .width(Length::Fill)
        .height(Length::FillPortion(3));

    let caption = Text::new(i18n.tr("input-image-caption"))
        .size(typography::CAPTION)
        .style(|_theme: &iced::Theme| iced::widget::text::Style {
            color: Some(crate::ui::theme::muted_text_color()),
        });

    let mut column = Column::new()
        .spacing(spacing::SM)
        .align_x(alignment::Horizontal::Center)
        .width(Length::Fill)
        .push(picture)
        .push(caption);

    if let Some((kind, details)) = &state.error {
        column = column.push(inline_error(*kind, details, i18n));
    }

    let results_section = results::view(
        state.predictions.as_ref(),
        state.top_k as usize,
        state.is_classifying,
        i18n,
    );
    column = column.push(results_section);

    scrollable(column).into()
}

fn inline_error<'a>(kind: ErrorKind, details: &str, i18n: &'a I18n) -> Element<'a, Message> {
    ErrorDisplay::new(ErrorSeverity::Error)
        .title(i18n.tr(kind.title_key()))
        .details(details.to_owned())
        .action(i18n.tr("sidebar-open-file"), Message::OpenFilePressed)
        .view()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::Prediction;

    fn sample_predictions() -> PredictionSet {
        PredictionSet::from_unsorted(vec![
            Prediction::new("tabby cat", 0.91),
            Prediction::new("tiger cat", 0.05),
        ])
    }

    #[test]
    fn default_state_uses_default_top_k() {
        let state = State::new();
        assert_eq!(state.top_k(), TOP_K_DEFAULT);
        assert!(state.image().is_none());
        assert!(!state.is_classifying());
    }

    #[test]
    fn top_k_changes_are_clamped() {
        let mut state = State::new();
        let event = update(&mut state, Message::TopKChanged(200));
        assert_eq!(state.top_k(), TOP_K_MAX);
        assert!(matches!(event, Event::TopKChanged(k) if k == TOP_K_MAX));
    }

    #[test]
    fn classify_without_image_is_ignored() {
        let mut state = State::new();
        let event = update(&mut state, Message::ClassifyPressed);
        assert!(matches!(event, Event::None));
    }

    #[test]
    fn classify_with_image_emits_event() {
        let mut state = State::new();
        state.set_image(ImageData::from_rgba(1, 1, vec![0, 0, 0, 255]));
        let event = update(&mut state, Message::ClassifyPressed);
        assert!(matches!(event, Event::Classify));
    }

    #[test]
    fn classify_while_running_is_ignored() {
        let mut state = State::new();
        state.set_image(ImageData::from_rgba(1, 1, vec![0, 0, 0, 255]));
        state.set_classifying(true);
        let event = update(&mut state, Message::ClassifyPressed);
        assert!(matches!(event, Event::None));
    }

    #[test]
    fn new_image_clears_results_and_errors() {
        let mut state = State::new();
        state.set_predictions(sample_predictions());
        state.set_error(ErrorKind::Classify, "boom".into());
        state.set_image(ImageData::from_rgba(1, 1, vec![0, 0, 0, 255]));
        assert!(state.predictions.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn new_image_invalidates_in_flight_inference() {
        let mut state = State::new();
        state.set_image(ImageData::from_rgba(1, 1, vec![0, 0, 0, 255]));
        let before = state.classify_generation();
        state.set_classifying(true);
        state.set_image(ImageData::from_rgba(1, 1, vec![255, 255, 255, 255]));
        assert_ne!(state.classify_generation(), before);
        assert!(!state.is_classifying());
    }

    #[test]
    fn predictions_clear_in_flight_flag() {
        let mut state = State::new();
        state.set_classifying(true);
        state.set_predictions(sample_predictions());
        assert!(!state.is_classifying());
    }

    #[test]
    fn error_clears_in_flight_flag() {
        let mut state = State::new();
        state.set_classifying(true);
        state.set_error(ErrorKind::Classify, "no labels".into());
        assert!(!state.is_classifying());
    }

    #[test]
    fn config_top_k_is_clamped() {
        let mut state = State::new();
        state.set_top_k_from_config(0);
        assert_eq!(state.top_k(), TOP_K_MIN);
        state.set_top_k_from_config(99);
        assert_eq!(state.top_k(), TOP_K_MAX);
    }
}
