// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the application.
//!
//! Localization uses the Fluent system with `.ftl` resources embedded in
//! the binary. The locale is resolved from CLI flag, then config, then the
//! OS locale, falling back to `en-US`.

pub mod fluent;
