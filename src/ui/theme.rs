// SPDX-License-Identifier: MPL-2.0
//! Theme mode handling and semantic text colors.

use crate::ui::design_tokens::palette;
use iced::Color;
use serde::{Deserialize, Serialize};

/// User-selectable theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];

    /// Resolves the effective Iced theme, consulting the OS preference for
    /// `System`.
    #[must_use]
    pub fn resolve(self) -> iced::Theme {
        match self {
            ThemeMode::Light => iced::Theme::Light,
            ThemeMode::Dark => iced::Theme::Dark,
            ThemeMode::System => match dark_light::detect() {
                Ok(dark_light::Mode::Light) => iced::Theme::Light,
                _ => iced::Theme::Dark,
            },
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ThemeMode::Light => "Light",
            ThemeMode::Dark => "Dark",
            ThemeMode::System => "System",
        };
        write!(f, "{name}")
    }
}

/// Color for de-emphasized helper text.
#[must_use]
pub fn muted_text_color() -> Color {
    palette::GRAY_400
}

/// Color for error text.
#[must_use]
pub fn error_text_color() -> Color {
    palette::ERROR_500
}

/// Color for success/confirmation text.
#[must_use]
pub fn success_text_color() -> Color {
    palette::SUCCESS_500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_system() {
        assert_eq!(ThemeMode::default(), ThemeMode::System);
    }

    #[test]
    fn explicit_modes_resolve_directly() {
        assert!(matches!(ThemeMode::Light.resolve(), iced::Theme::Light));
        assert!(matches!(ThemeMode::Dark.resolve(), iced::Theme::Dark));
    }

    #[test]
    fn theme_mode_serializes_lowercase() {
        let toml = toml::to_string(&std::collections::BTreeMap::from([(
            "theme_mode",
            ThemeMode::Dark,
        )]))
        .unwrap();
        assert!(toml.contains("\"dark\""));
    }
}
