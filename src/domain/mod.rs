// SPDX-License-Identifier: MPL-2.0
//! Domain types shared across the classifier pipeline and the UI.

pub mod prediction;

pub use prediction::{Prediction, PredictionSet, TOP_K_DEFAULT, TOP_K_MAX, TOP_K_MIN};
