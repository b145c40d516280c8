// SPDX-License-Identifier: MPL-2.0
//! Settings screen: language selection and theme preference.

use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{spacing, typography};
use crate::ui::styles::button as button_styles;
use crate::ui::theme::ThemeMode;
use iced::{
    alignment::Horizontal,
    widget::{button, pick_list, Column, Text},
    Element, Length,
};
use unic_langid::LanguageIdentifier;

/// Contextual data needed to render the settings screen.
pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub theme_mode: ThemeMode,
}

/// Messages emitted by the settings screen.
#[derive(Debug, Clone)]
pub enum Message {
    LanguageSelected(LanguageIdentifier),
    ThemeModeSelected(ThemeMode),
    Back,
}

pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let title = Text::new(ctx.i18n.tr("settings-title")).size(typography::TITLE_LG);

    let mut language_column = Column::new()
        .spacing(spacing::XS)
        .push(Text::new(ctx.i18n.tr("settings-language")).size(typography::BODY_LG));

    for locale in &ctx.i18n.available_locales {
        let is_current = ctx.i18n.current_locale() == locale;
        let label = Text::new(locale.to_string()).size(typography::BODY);

        let mut locale_button =
            button(label).on_press(Message::LanguageSelected(locale.clone()));
        locale_button = if is_current {
            locale_button.style(button_styles::primary)
        } else {
            locale_button.style(button_styles::secondary)
        };

        language_column = language_column.push(locale_button);
    }

    let theme_column = Column::new()
        .spacing(spacing::XS)
        .push(Text::new(ctx.i18n.tr("settings-theme")).size(typography::BODY_LG))
        .push(pick_list(
            ThemeMode::ALL,
            Some(ctx.theme_mode),
            Message::ThemeModeSelected,
        ));

    let back_button = button(Text::new(ctx.i18n.tr("settings-back")))
        .on_press(Message::Back)
        .style(button_styles::secondary);

    Column::new()
        .push(title)
        .push(language_column)
        .push(theme_column)
        .push(back_button)
        .spacing(spacing::LG)
        .padding(spacing::LG)
        .width(Length::Fill)
        .align_x(Horizontal::Center)
        .into()
}
