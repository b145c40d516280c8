// SPDX-License-Identifier: MPL-2.0
//! About screen with a short description of the application.

use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{spacing, typography};
use crate::ui::styles::button as button_styles;
use iced::{
    alignment::Horizontal,
    widget::{button, Column, Text},
    Element, Length,
};

/// Messages emitted by the about screen.
#[derive(Debug, Clone)]
pub enum Message {
    Back,
}

pub fn view(i18n: &I18n) -> Element<'_, Message> {
    let title = Text::new(i18n.tr("about-title")).size(typography::TITLE_LG);

    let description = Text::new(i18n.tr("about-description"))
        .size(typography::BODY)
        .width(Length::Fixed(480.0));

    let version = Text::new(format!("v{}", env!("CARGO_PKG_VERSION"))).size(typography::CAPTION);

    let back_button = button(Text::new(i18n.tr("about-back")))
        .on_press(Message::Back)
        .style(button_styles::secondary);

    Column::new()
        .push(title)
        .push(description)
        .push(version)
        .push(back_button)
        .spacing(spacing::LG)
        .padding(spacing::LG)
        .width(Length::Fill)
        .align_x(Horizontal::Center)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_about_returns_element() {
        let i18n = I18n::default();
        let _element = view(&i18n);
    }
}
