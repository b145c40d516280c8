// SPDX-License-Identifier: MPL-2.0
//! View rendering for the application.
//!
//! Renders the current screen, the navbar, and the toast overlay stacked
//! on top of the content.

use super::{App, Message, Screen};
use crate::ui::about;
use crate::ui::classifier as classifier_screen;
use crate::ui::navbar::{self, ViewContext as NavbarViewContext};
use crate::ui::notifications::Toast;
use crate::ui::settings::{self, ViewContext as SettingsViewContext};
use iced::widget::{Column, Container, Stack};
use iced::{Element, Length};

impl App {
    pub(crate) fn view(&self) -> Element<'_, Message> {
        let current_view: Element<'_, Message> = match self.screen {
            Screen::Classifier => self.view_classifier(),
            Screen::Settings => settings::view(SettingsViewContext {
                i18n: &self.i18n,
                theme_mode: self.theme_mode,
            })
            .map(Message::Settings),
            Screen::About => about::view(&self.i18n).map(Message::About),
        };

        let base = Container::new(current_view)
            .width(Length::Fill)
            .height(Length::Fill);

        let toasts = Toast::view_overlay(&self.notifications, &self.i18n).map(Message::Notification);

        Stack::new().push(base).push(toasts).into()
    }

    fn view_classifier(&self) -> Element<'_, Message> {
        let navbar_view = navbar::view(NavbarViewContext {
            i18n: &self.i18n,
            menu_open: self.menu_open,
        })
        .map(Message::Navbar);

        let screen_view =
            classifier_screen::view(&self.classifier_screen, &self.i18n).map(Message::Classifier);

        Column::new()
            .push(navbar_view)
            .push(
                Container::new(screen_view)
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_renders_every_screen() {
        let mut app = App::default();
        for screen in [Screen::Classifier, Screen::Settings, Screen::About] {
            app.screen = screen;
            let _element = app.view();
        }
    }
}
