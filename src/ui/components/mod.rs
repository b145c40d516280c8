// SPDX-License-Identifier: MPL-2.0
//! Reusable UI components shared across multiple screens.
//!
//! - [`error_display`] - Consistent error presentation with severity levels
//!   and an optional recovery action

pub mod error_display;
