// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration between the screens.
//!
//! The `App` struct wires together the classification screen, localization,
//! settings, and the shared classifier, and translates messages into side
//! effects like config persistence, model downloads, or inference tasks.

mod message;
pub mod paths;
mod screen;
mod subscription;
mod update;
mod view;

pub use message::{Flags, Message};
pub use screen::Screen;

use crate::classifier::{self, ModelStatus, SharedClassifier};
use crate::config::{self, Config};
use crate::domain::prediction::TOP_K_DEFAULT;
use crate::i18n::fluent::I18n;
use crate::media;
use crate::ui::classifier as classifier_screen;
use crate::ui::notifications;
use crate::ui::theme::ThemeMode;
use iced::{window, Subscription, Task, Theme};
use std::fmt;

/// Root Iced application state that bridges UI components, localization, and
/// persisted preferences.
pub struct App {
    pub i18n: I18n,
    screen: Screen,
    classifier_screen: classifier_screen::State,
    /// Shared classifier so the loaded ONNX session survives across runs.
    classifier: SharedClassifier,
    config: Config,
    theme_mode: ThemeMode,
    /// Whether the hamburger menu is open.
    menu_open: bool,
    /// Toast notification manager for user feedback.
    notifications: notifications::Manager,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("has_image", &self.classifier_screen.image().is_some())
            .finish()
    }
}

pub const WINDOW_DEFAULT_HEIGHT: u32 = 700;
pub const WINDOW_DEFAULT_WIDTH: u32 = 960;
pub const MIN_WINDOW_HEIGHT: u32 = 500;
pub const MIN_WINDOW_WIDTH: u32 = 640;

/// Builds the window settings.
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    // Wrap flags in RefCell<Option<_>> to satisfy the Fn trait requirement
    // while only consuming flags once (iced 0.14 requires Fn, not FnOnce)
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state
            .borrow_mut()
            .take()
            .expect("Boot function called more than once");
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

impl Default for App {
    fn default() -> Self {
        Self {
            i18n: I18n::default(),
            screen: Screen::Classifier,
            classifier_screen: classifier_screen::State::new(),
            classifier: classifier::create_shared_classifier(),
            config: Config::default(),
            theme_mode: ThemeMode::System,
            menu_open: false,
            notifications: notifications::Manager::new(),
        }
    }
}

impl App {
    /// Initializes application state and kicks off startup tasks: model
    /// validation when the artifacts are already on disk, and image loading
    /// when a path was passed on the command line.
    fn new(flags: Flags) -> (Self, Task<Message>) {
        paths::init_cli_overrides(flags.data_dir.clone(), flags.config_dir.clone());

        let mut notifications = notifications::Manager::new();
        let config = Self::config_or_default(config::load(), &mut notifications);
        let i18n = I18n::new(flags.lang.clone(), &config);

        let mut app = App {
            i18n,
            notifications,
            ..Self::default()
        };

        app.theme_mode = config.theme_mode.unwrap_or_default();
        app.classifier_screen
            .set_top_k_from_config(config.top_k.unwrap_or(TOP_K_DEFAULT));
        app.config = config;

        let mut tasks = Vec::new();

        if classifier::is_model_downloaded() {
            app.classifier_screen
                .set_model_status(ModelStatus::Validating);
            tasks.push(app.validation_task(true));
        }

        if let Some(path) = flags.file_path {
            tasks.push(Self::load_image_task(path.into()));
        }

        (app, Task::batch(tasks))
    }

    /// Falls back to the default config when loading fails, queueing a
    /// warning toast so the user knows their settings file was ignored.
    fn config_or_default(
        result: crate::error::Result<Config>,
        notifications: &mut notifications::Manager,
    ) -> Config {
        match result {
            Ok(config) => config,
            Err(_) => {
                notifications.push(notifications::Notification::warning(
                    "notify-config-load-warning",
                ));
                Config::default()
            }
        }
    }

    fn title(&self) -> String {
        self.i18n.tr("window-title")
    }

    fn theme(&self) -> Theme {
        self.theme_mode.resolve()
    }

    fn subscription(&self) -> Subscription<Message> {
        subscription::create_subscription(self.screen, &self.notifications)
    }

    /// Loads and decodes an image off the UI thread.
    fn load_image_task(path: std::path::PathBuf) -> Task<Message> {
        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || media::load_image(&path))
                    .await
                    .map_err(|e| crate::error::Error::Io(e.to_string()))?
            },
            Message::ImageLoaded,
        )
    }
}
