// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.
//!
//! File drops are only handled on the classifier screen. A periodic tick
//! drives toast auto-dismiss while notifications are visible.

use super::{Message, Screen};
use crate::ui::notifications::{self, NotificationMessage};
use iced::{event, time, Subscription};
use std::time::Duration;

pub fn create_subscription(
    screen: Screen,
    notifications: &notifications::Manager,
) -> Subscription<Message> {
    let mut subscriptions = Vec::new();

    if screen == Screen::Classifier {
        subscriptions.push(event::listen_with(|event, _status, _window_id| {
            if let event::Event::Window(iced::window::Event::FileDropped(path)) = &event {
                return Some(Message::FileDropped(path.clone()));
            }
            None
        }));
    }

    if notifications.has_notifications() {
        subscriptions.push(
            time::every(Duration::from_millis(500))
                .map(|_| Message::Notification(NotificationMessage::Tick)),
        );
    }

    Subscription::batch(subscriptions)
}
