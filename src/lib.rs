// SPDX-License-Identifier: MPL-2.0
//! `iced_classify` is a minimal image-classification demo built with the
//! Iced GUI framework.
//!
//! It runs a pretrained Vision Transformer (ONNX) over a user-supplied
//! image and shows the top-K predicted labels with confidence scores. The
//! crate demonstrates internationalization with Fluent, user preference
//! management, and modular UI design.

#![doc(html_root_url = "https://docs.rs/iced_classify/0.1.0")]

pub mod app;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod i18n;
pub mod media;
pub mod ui;
