// SPDX-License-Identifier: MPL-2.0
//! Prediction results view.
//!
//! Shows a headline for the best label, a horizontal bar chart where bar
//! lengths are relative to the best score, and a per-label confidence
//! progress bar on the absolute 0..1 scale.

use super::Message;
use crate::domain::prediction::{Prediction, PredictionSet};
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{palette, radius, sizing, spacing, typography};
use crate::ui::theme;
use iced::widget::{container, progress_bar, Column, Container, Row, Space, Text};
use iced::{alignment, Element, Length, Theme};

/// Render the results section below the input image.
pub fn view<'a>(
    predictions: Option<&'a PredictionSet>,
    top_k: usize,
    is_classifying: bool,
    i18n: &'a I18n,
) -> Element<'a, Message> {
    let title = Text::new(i18n.tr("results-title")).size(typography::TITLE_MD);

    let mut column = Column::new()
        .spacing(spacing::SM)
        .width(Length::Fill)
        .push(title);

    match predictions {
        Some(set) if !set.is_empty() => {
            let shown: Vec<&Prediction> = set.iter().take(top_k.max(1)).collect();
            // The set is sorted, so the first entry carries the best score.
            let max_score = shown[0].score().max(f32::EPSILON);

            column = column.push(headline(shown[0], i18n));

            for prediction in &shown {
                column = column.push(result_row(prediction, max_score));
            }
        }
        _ => {
            let key = if is_classifying {
                "sidebar-classifying"
            } else {
                "results-empty"
            };
            let placeholder = Text::new(i18n.tr(key))
                .size(typography::BODY)
                .style(|_theme: &Theme| iced::widget::text::Style {
                    color: Some(theme::muted_text_color()),
                });
            column = column.push(placeholder);
        }
    }

    Container::new(column)
        .width(Length::Fill)
        .padding(spacing::SM)
        .into()
}

/// "This looks like tabby cat (91.00%)" line for the best prediction.
fn headline<'a>(best: &Prediction, i18n: &'a I18n) -> Element<'a, Message> {
    let message = i18n.tr_with_args(
        "results-headline",
        &[("label", best.label()), ("percent", best.percent().as_str())],
    );

    Text::new(message).size(typography::BODY_LG).into()
}

/// One result line: label, relative bar, absolute confidence bar, percent.
fn result_row<'a>(prediction: &Prediction, max_score: f32) -> Element<'a, Message> {
    let label = Text::new(prediction.label().to_owned())
        .size(typography::BODY)
        .width(Length::FillPortion(2));

    // Bar length relative to the best score so small differences stay legible.
    let relative = (prediction.score() / max_score).clamp(0.0, 1.0);
    let bar = relative_bar(relative);

    let confidence = progress_bar(0.0..=1.0, prediction.score());

    let percent = Text::new(prediction.percent())
        .size(typography::BODY_SM)
        .width(Length::Fixed(64.0))
        .align_x(alignment::Horizontal::Right);

    let chart_column = Column::new()
        .spacing(spacing::XXS)
        .width(Length::FillPortion(3))
        .push(bar)
        .push(confidence);

    Row::new()
        .spacing(spacing::SM)
        .align_y(alignment::Vertical::Center)
        .push(label)
        .push(chart_column)
        .push(percent)
        .into()
}

/// A filled bar whose width is a fraction of the available space.
fn relative_bar<'a>(fraction: f32) -> Element<'a, Message> {
    let filled_portion = (fraction * 1000.0).max(1.0) as u16;
    let empty_portion = 1000u16.saturating_sub(filled_portion).max(1);

    let filled = Container::new(
        Space::new()
            .width(Length::Fill)
            .height(Length::Fixed(sizing::RESULT_BAR_HEIGHT)),
    )
    .width(Length::FillPortion(filled_portion))
        .style(|_theme: &Theme| container::Style {
            background: Some(iced::Background::Color(palette::PRIMARY_500)),
            border: iced::Border {
                radius: radius::SM.into(),
                ..Default::default()
            },
            ..Default::default()
        });

    let empty = Space::new()
        .width(Length::FillPortion(empty_portion))
        .height(Length::Fixed(sizing::RESULT_BAR_HEIGHT));

    Row::new().push(filled).push(empty).into()
}
