// SPDX-License-Identifier: MPL-2.0
//! Image input channels: file decoding and camera frame capture.

pub mod capture;
pub mod image;

pub use image::{decode_image, is_supported_extension, load_image, ImageData};
