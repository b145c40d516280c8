// SPDX-License-Identifier: MPL-2.0
//! Sidebar for the classification screen.
//!
//! Shows:
//! - Image source buttons (open file, capture frame)
//! - The top-K slider
//! - The classify button (or an in-progress label)
//! - A model status panel with download progress

use super::{Message, State};
use crate::classifier::ModelStatus;
use crate::domain::prediction::{TOP_K_MAX, TOP_K_MIN};
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{spacing, typography};
use crate::ui::styles::button as button_styles;
use crate::ui::theme;
use iced::widget::{button, progress_bar, slider, text, Column};
use iced::{Element, Length, Theme};

/// Render the sidebar.
pub fn view<'a>(state: &'a State, i18n: &'a I18n) -> Element<'a, Message> {
    let mut content = Column::new().spacing(spacing::MD);

    content = content.push(source_section(i18n));
    content = content.push(topk_section(state, i18n));
    content = content.push(classify_section(state, i18n));
    content = content.push(model_section(state.model_status(), i18n));

    content.into()
}

fn source_section<'a>(i18n: &'a I18n) -> Element<'a, Message> {
    let title = text(i18n.tr("sidebar-source-title")).size(typography::TITLE_SM);

    let open_btn = button(text(i18n.tr("sidebar-open-file")).size(typography::BODY))
        .padding(spacing::SM)
        .width(Length::Fill)
        .on_press(Message::OpenFilePressed)
        .style(button_styles::secondary);

    let capture_btn = button(text(i18n.tr("sidebar-capture")).size(typography::BODY))
        .padding(spacing::SM)
        .width(Length::Fill)
        .on_press(Message::CapturePressed)
        .style(button_styles::secondary);

    Column::new()
        .spacing(spacing::XS)
        .push(title)
        .push(open_btn)
        .push(capture_btn)
        .into()
}

fn topk_section<'a>(state: &'a State, i18n: &'a I18n) -> Element<'a, Message> {
    let k = state.top_k();
    let label = text(i18n.tr_with_args("sidebar-topk-label", &[("k", k.to_string().as_str())]))
        .size(typography::BODY);

    let k_slider = slider(TOP_K_MIN..=TOP_K_MAX, k, Message::TopKChanged);

    Column::new()
        .spacing(spacing::XS)
        .push(label)
        .push(k_slider)
        .into()
}

fn classify_section<'a>(state: &'a State, i18n: &'a I18n) -> Element<'a, Message> {
    let mut content = Column::new().spacing(spacing::XS);

    let model_ready = matches!(state.model_status(), ModelStatus::Ready);
    let can_classify = state.image().is_some() && model_ready && !state.is_classifying();

    let label_key = if state.is_classifying() {
        "sidebar-classifying"
    } else {
        "sidebar-classify"
    };
    let classify_label = text(i18n.tr(label_key)).size(typography::BODY_LG);

    let classify_btn = if can_classify {
        button(classify_label)
            .padding(spacing::SM)
            .width(Length::Fill)
            .on_press(Message::ClassifyPressed)
            .style(button_styles::primary)
    } else {
        button(classify_label)
            .padding(spacing::SM)
            .width(Length::Fill)
            .style(button_styles::disabled())
    };
    content = content.push(classify_btn);

    content.into()
}

/// Model status panel mirroring the lifecycle of the ONNX session.
fn model_section<'a>(status: &'a ModelStatus, i18n: &'a I18n) -> Element<'a, Message> {
    let title = text(i18n.tr("model-status-title")).size(typography::TITLE_SM);
    let mut content = Column::new().spacing(spacing::XS).push(title);

    match status {
        ModelStatus::NotDownloaded => {
            let hint = text(i18n.tr("model-status-not-downloaded"))
                .size(typography::BODY_SM)
                .style(move |_: &Theme| iced::widget::text::Style {
                    color: Some(theme::muted_text_color()),
                });
            content = content.push(hint);

            let download_btn = button(text(i18n.tr("model-status-download")).size(typography::BODY))
                .padding(spacing::SM)
                .width(Length::Fill)
                .on_press(Message::DownloadModelPressed)
                .style(button_styles::primary);
            content = content.push(download_btn);
        }
        ModelStatus::Downloading { progress } => {
            content = content.push(progress_bar(0.0..=1.0, *progress));

            let progress_text = text(i18n.tr_with_args(
                "model-status-downloading",
                &[("progress", format!("{}", (*progress * 100.0) as u32).as_str())],
            ))
            .size(typography::BODY_SM);
            content = content.push(progress_text);
        }
        ModelStatus::Validating => {
            let validating = text(i18n.tr("model-status-validating"))
                .size(typography::BODY_SM)
                .style(move |_: &Theme| iced::widget::text::Style {
                    color: Some(theme::muted_text_color()),
                });
            content = content.push(validating);
        }
        ModelStatus::Ready => {
            let ready = text(i18n.tr("model-status-ready"))
                .size(typography::BODY_SM)
                .style(move |_: &Theme| iced::widget::text::Style {
                    color: Some(theme::success_text_color()),
                });
            content = content.push(ready);
        }
        ModelStatus::Error(error_msg) => {
            let error_text = text(
                i18n.tr_with_args("model-status-error", &[("error", error_msg.as_str())]),
            )
            .size(typography::BODY_SM)
            .style(move |_: &Theme| iced::widget::text::Style {
                color: Some(theme::error_text_color()),
            });
            content = content.push(error_text);

            let retry_btn = button(text(i18n.tr("model-status-download")).size(typography::BODY))
                .padding(spacing::SM)
                .width(Length::Fill)
                .on_press(Message::DownloadModelPressed)
                .style(button_styles::secondary);
            content = content.push(retry_btn);
        }
    }

    content.into()
}
