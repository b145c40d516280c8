// SPDX-License-Identifier: MPL-2.0
//! UI layer: screens, reusable components, styling, and design tokens.

pub mod about;
pub mod classifier;
pub mod components;
pub mod design_tokens;
pub mod navbar;
pub mod notifications;
pub mod settings;
pub mod styles;
pub mod theme;
