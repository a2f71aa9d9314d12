// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Named option providers declared on the entity.

use darling::FromMeta;

/// `source(name = "...", with = "path")` inside `#[form(...)]`.
///
/// Declares a provider that `#[field(options_from = "...")]` can refer to.
///
/// # Examples
///
/// ```rust,ignore
/// #[form(source(name = "tiers", with = "tier_options"))]
/// #[form(source(name = "tiers", with = "crate::catalog::tiers"))]
/// ```
#[derive(Debug, FromMeta)]
pub struct OptionSource {
    /// Provider name used by `options_from`.
    pub name: String,

    /// Path of a `fn() -> Vec<SelectOption>`.
    pub with: syn::Path
}
